// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Authorizer Service
//!
//! Produces an authorization decision for the hosting gateway's
//! access-control layer. Shares the verification primitive with the
//! dispatcher; the dispatcher re-verifies anyway, so this component may be
//! deployed or skipped independently without weakening authentication.
//!
//! On success the decision carries an allow statement scoped to the
//! requested resource, the optional trace-propagation pair from the
//! observability sink, and the optional usage-plan key.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::domain::policy::{AuthDecision, GatewayPolicy, TraceContext};
use crate::domain::signed_request::{RequestVerifier, SignedRequest};
use crate::infrastructure::observability::ObservabilitySink;

pub struct AuthorizerService {
    verifier: Arc<dyn RequestVerifier>,
    sink: Arc<ObservabilitySink>,
    client_id: String,
    usage_plan_api_key: Option<String>,
}

impl AuthorizerService {
    pub fn new(
        verifier: Arc<dyn RequestVerifier>,
        sink: Arc<ObservabilitySink>,
        client_id: String,
        usage_plan_api_key: Option<String>,
    ) -> Self {
        Self {
            verifier,
            sink,
            client_id,
            usage_plan_api_key,
        }
    }

    /// Produce one decision for one request. No caching, no retry.
    pub fn authorize(
        &self,
        request: &SignedRequest,
        resource: &str,
        now: DateTime<Utc>,
    ) -> AuthDecision {
        if let Err(error) = self.verifier.verify(request, now) {
            self.sink.record_rejection(&error);
            return AuthDecision::Denied {
                reason: error.reason(),
            };
        }

        let mut policy = GatewayPolicy::allow(&self.client_id, resource);

        if let Some((header, value)) = self.sink.trace_propagation_header() {
            policy.context = Some(TraceContext {
                honeycomb_header: header,
                honeycomb_value: value,
            });
        }
        policy.usage_identifier_key = self.usage_plan_api_key.clone();

        debug!(resource, principal = %policy.principal_id, "authorization allowed");
        AuthDecision::Allowed(policy)
    }
}
