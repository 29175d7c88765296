// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::application::authorizer::AuthorizerService;
use crate::application::dispatch::InteractionDispatchService;
use crate::domain::policy::AuthDecision;
use crate::domain::signed_request::SignedRequest;

/// Signature header, hex-encoded Ed25519 signature.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
/// Timestamp header, decimal Unix epoch seconds.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";
/// Resource the hosting gateway is asking an authorization decision for.
pub const RESOURCE_HEADER: &str = "x-forwarded-resource";

pub struct AppState {
    pub dispatch: Arc<InteractionDispatchService>,
    pub authorizer: Arc<AuthorizerService>,
}

pub fn app(dispatch: Arc<InteractionDispatchService>, authorizer: Arc<AuthorizerService>) -> Router {
    let state = Arc::new(AppState {
        dispatch,
        authorizer,
    });

    Router::new()
        .route("/interactions", post(handle_interaction))
        .route("/authorize", post(handle_authorize))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Assemble the domain request from headers and the raw body bytes.
///
/// Absent headers become empty strings and fail verification through the
/// normal `BadSignature`/`BadTimestamp` paths.
fn signed_request(headers: &HeaderMap, body: &Bytes) -> SignedRequest {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    SignedRequest {
        body: String::from_utf8_lossy(body).into_owned(),
        signature_hex: header(SIGNATURE_HEADER),
        timestamp: header(TIMESTAMP_HEADER),
    }
}

async fn handle_interaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = signed_request(&headers, &body);
    let response = state.dispatch.handle(&request, Utc::now()).await;

    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body))
}

async fn handle_authorize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = signed_request(&headers, &body);
    let resource = headers
        .get(RESOURCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("*");

    match state.authorizer.authorize(&request, resource, Utc::now()) {
        AuthDecision::Allowed(policy) => {
            (StatusCode::OK, Json(serde_json::to_value(policy).unwrap_or_default()))
        }
        AuthDecision::Denied { reason } => {
            (StatusCode::UNAUTHORIZED, Json(json!({"error": reason})))
        }
    }
}

async fn healthz() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}
