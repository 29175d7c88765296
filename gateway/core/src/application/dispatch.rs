// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Interaction Dispatch Service
//!
//! The single dispatcher for inbound interactions. Each request moves
//! through a small state machine:
//!
//! ```text
//! Unverified
//!   └─ RequestVerifier::verify ──fail──▶ Rejected (401, minimal error body)
//!   └─ ok ──▶ Verified
//!         └─ type 1 ──▶ Acknowledged    ({"type":1}, 200)
//!         └─ type 2 ──▶ CommandHandled  ({"type":4,...}, 200)
//!         └─ other  ──▶ Rejected        (500, protocol mismatch)
//! ```
//!
//! Command handling is fail-open with a visible diagnostic: evaluator and
//! structural failures alike become a 200 response whose content is the
//! failure message, because the end user is the one who can correct the
//! input. An empty expression is not an error — it yields the static help
//! document.
//!
//! ## Invariants
//!
//! - Verification runs here even when an upstream authorizer already ran it
//!   (defense in depth; deployment topology may bypass the authorizer).
//! - Identical input produces an identical response; no state crosses
//!   requests.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::evaluator::DiceEvaluator;
use crate::domain::interaction::{InteractionEnvelope, InteractionKind};
use crate::domain::signed_request::{RequestVerifier, SignedRequest, VerificationError};
use crate::infrastructure::observability::ObservabilitySink;

/// Static help document returned for an empty expression.
pub const HELP_TEXT: &str = "**/roll** \u{2014} roll dice\n\n\
Usage: `/roll expression:<dice>`\n\n\
Expressions are `<count>d<sides>` with an optional modifier:\n\
`1d20` \u{2014} one twenty-sided die\n\
`4d6` \u{2014} four six-sided dice\n\
`2d8+3` \u{2014} two eight-sided dice, plus three";

/// Terminal response for one interaction: HTTP-equivalent status plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionResponse {
    pub status: u16,
    pub body: Value,
}

impl InteractionResponse {
    /// Handshake acknowledgment.
    fn pong() -> Self {
        Self {
            status: 200,
            body: json!({"type": 1}),
        }
    }

    /// Channel-message response carrying user-visible content.
    fn message(content: String) -> Self {
        Self {
            status: 200,
            body: json!({"type": 4, "data": {"content": content}}),
        }
    }

    /// Authentication failure. The body names which check failed, nothing
    /// more.
    fn unauthorized(error: &VerificationError) -> Self {
        Self {
            status: 401,
            body: json!({"error": error.reason()}),
        }
    }

    /// Protocol mismatch: an interaction type this gateway does not speak.
    fn unhandled() -> Self {
        Self {
            status: 500,
            body: json!({"message": "Unhandled interaction type."}),
        }
    }
}

/// Dispatches verified interactions to the handshake or command path.
///
/// Stateless; a single instance is shared across request handlers.
pub struct InteractionDispatchService {
    verifier: Arc<dyn RequestVerifier>,
    evaluator: Arc<dyn DiceEvaluator>,
    sink: Arc<ObservabilitySink>,
}

impl InteractionDispatchService {
    pub fn new(
        verifier: Arc<dyn RequestVerifier>,
        evaluator: Arc<dyn DiceEvaluator>,
        sink: Arc<ObservabilitySink>,
    ) -> Self {
        Self {
            verifier,
            evaluator,
            sink,
        }
    }

    /// Handle one signed delivery end to end.
    pub async fn handle(&self, request: &SignedRequest, now: DateTime<Utc>) -> InteractionResponse {
        if let Err(error) = self.verifier.verify(request, now) {
            self.sink.record_rejection(&error);
            return InteractionResponse::unauthorized(&error);
        }

        let envelope = match InteractionEnvelope::from_json(&request.body) {
            Ok(envelope) => envelope,
            Err(error) => {
                // A correctly signed body that is not JSON at all is a
                // platform/client mismatch, same as an unknown type.
                warn!(%error, "signed body is not an interaction envelope");
                return InteractionResponse::unhandled();
            }
        };

        // Routing reads only the `type` field; malformed siblings are dealt
        // with inside the command path, where they become user-visible
        // messages instead of faults.
        match envelope.kind() {
            InteractionKind::Ping => {
                debug!("acknowledging handshake ping");
                InteractionResponse::pong()
            }
            InteractionKind::Command => {
                let content = match self.roll(&envelope).await {
                    Ok(content) => content,
                    Err(message) => message,
                };
                InteractionResponse::message(content)
            }
            InteractionKind::Unhandled(interaction_type) => {
                warn!(?interaction_type, "unhandled interaction type");
                InteractionResponse::unhandled()
            }
        }
    }

    /// Produce the command-response content.
    ///
    /// The `Err` variant is a user-visible message, not an internal error:
    /// structural and evaluator failures are surfaced uniformly.
    async fn roll(&self, envelope: &InteractionEnvelope) -> Result<String, String> {
        let invocation = envelope.command().map_err(|e| e.to_string())?;

        let expression = invocation.expression.trim();
        if expression.is_empty() {
            return Ok(HELP_TEXT.to_string());
        }

        let result = self
            .evaluator
            .evaluate(expression)
            .await
            .map_err(|e| e.0)?;

        // The evaluator sees the trimmed expression; the reply echoes the
        // text exactly as the user submitted it.
        Ok(format!(
            "{} rolled `\"{}\"`\nResult: {}",
            invocation.user, invocation.expression, result
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    use crate::domain::evaluator::EvaluationError;

    struct AcceptAll;

    impl RequestVerifier for AcceptAll {
        fn verify(&self, _: &SignedRequest, _: DateTime<Utc>) -> Result<(), VerificationError> {
            Ok(())
        }
    }

    struct RejectWith(VerificationError);

    impl RequestVerifier for RejectWith {
        fn verify(&self, _: &SignedRequest, _: DateTime<Utc>) -> Result<(), VerificationError> {
            Err(self.0.clone())
        }
    }

    struct FixedEvaluator(Result<String, EvaluationError>);

    #[async_trait]
    impl DiceEvaluator for FixedEvaluator {
        async fn evaluate(&self, _: &str) -> Result<String, EvaluationError> {
            self.0.clone()
        }
    }

    fn service_with(
        verifier: Arc<dyn RequestVerifier>,
        evaluator: Arc<dyn DiceEvaluator>,
    ) -> InteractionDispatchService {
        InteractionDispatchService::new(verifier, evaluator, Arc::new(ObservabilitySink::new(None)))
    }

    fn request(body: &str) -> SignedRequest {
        SignedRequest {
            body: body.to_string(),
            signature_hex: "00".repeat(64),
            timestamp: "1700000000".to_string(),
        }
    }

    fn command_body(user: &str, value: &str) -> String {
        format!(
            r#"{{"type":2,"member":{{"user":{{"username":"{user}","global_name":"{user}"}}}},"data":{{"name":"roll","options":[{{"value":"{value}"}}]}}}}"#
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn ping_is_acknowledged_regardless_of_other_fields() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let response = service
            .handle(&request(r#"{"type":1,"token":"t","version":1}"#), now())
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({"type": 1}));
    }

    #[tokio::test]
    async fn ping_is_acknowledged_even_with_wrong_shaped_siblings() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let response = service
            .handle(&request(r#"{"type":1,"member":"oops","data":42}"#), now())
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({"type": 1}));
    }

    #[tokio::test]
    async fn command_success_uses_the_fixed_template() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let response = service
            .handle(&request(&command_body("Alice", "4d6")), now())
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            json!({"type": 4, "data": {"content": "Alice rolled `\"4d6\"`\nResult: 18"}})
        );
    }

    #[tokio::test]
    async fn empty_and_whitespace_expressions_yield_help() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );

        for value in ["", "   "] {
            let response = service
                .handle(&request(&command_body("Alice", value)), now())
                .await;
            assert_eq!(response.status, 200);
            assert_eq!(response.body["data"]["content"], HELP_TEXT);
        }
    }

    #[tokio::test]
    async fn evaluator_failure_message_is_shown_verbatim() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Err(EvaluationError(
                "Unknown die size".into(),
            )))),
        );
        let response = service
            .handle(&request(&command_body("Alice", "4d7")), now())
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body["data"]["content"], "Unknown die size");
    }

    #[tokio::test]
    async fn structural_failure_is_surfaced_like_an_evaluator_failure() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let response = service
            .handle(&request(r#"{"type":2,"data":{"options":[]}}"#), now())
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body["data"]["content"], "Missing field: member.user");
    }

    #[tokio::test]
    async fn wrong_shaped_command_fields_are_a_message_not_a_fault() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let response = service
            .handle(
                &request(r#"{"type":2,"member":"oops","data":{"options":[{"value":"4d6"}]}}"#),
                now(),
            )
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body["data"]["content"], "Missing field: member.user");
    }

    #[tokio::test]
    async fn reply_echoes_submitted_text_while_evaluator_gets_trimmed() {
        struct CapturingEvaluator {
            seen: std::sync::Mutex<Option<String>>,
        }

        #[async_trait]
        impl DiceEvaluator for CapturingEvaluator {
            async fn evaluate(&self, expression: &str) -> Result<String, EvaluationError> {
                *self.seen.lock().unwrap() = Some(expression.to_string());
                Ok("18".to_string())
            }
        }

        let evaluator = Arc::new(CapturingEvaluator {
            seen: std::sync::Mutex::new(None),
        });
        let service = service_with(Arc::new(AcceptAll), evaluator.clone());

        let response = service
            .handle(&request(&command_body("Alice", " 4d6 ")), now())
            .await;

        assert_eq!(
            response.body["data"]["content"],
            "Alice rolled `\" 4d6 \"`\nResult: 18"
        );
        assert_eq!(evaluator.seen.lock().unwrap().as_deref(), Some("4d6"));
    }

    #[tokio::test]
    async fn unknown_interaction_type_is_a_server_fault() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let response = service.handle(&request(r#"{"type":3}"#), now()).await;

        assert_eq!(response.status, 500);
        assert_eq!(
            response.body,
            json!({"message": "Unhandled interaction type."})
        );
    }

    #[tokio::test]
    async fn unparseable_body_is_treated_as_a_protocol_mismatch() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let response = service.handle(&request("not json"), now()).await;

        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn verification_failure_yields_minimal_401_body() {
        let signature = service_with(
            Arc::new(RejectWith(VerificationError::BadSignature(
                "curve mismatch at byte 17".into(),
            ))),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let response = signature.handle(&request(r#"{"type":1}"#), now()).await;
        assert_eq!(response.status, 401);
        assert_eq!(response.body, json!({"error": "Bad signature."}));

        let timestamp = service_with(
            Arc::new(RejectWith(VerificationError::BadTimestamp(
                "drift 9000s".into(),
            ))),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let response = timestamp.handle(&request(r#"{"type":1}"#), now()).await;
        assert_eq!(response.status, 401);
        assert_eq!(response.body, json!({"error": "Bad timestamp."}));
    }

    #[tokio::test]
    async fn identical_input_produces_identical_responses() {
        let service = service_with(
            Arc::new(AcceptAll),
            Arc::new(FixedEvaluator(Ok("18".into()))),
        );
        let req = request(&command_body("Alice", "4d6"));

        let first = service.handle(&req, now()).await;
        let second = service.handle(&req, now()).await;
        assert_eq!(first, second);
    }
}
