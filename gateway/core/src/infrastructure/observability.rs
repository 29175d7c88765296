// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Observability Sink
//!
//! Structured diagnostic sink for the gateway. Two responsibilities:
//!
//! - record full verification-failure context (error kind and message) as
//!   `warn!` tracing events — this detail never reaches the caller, only
//!   the log pipeline;
//! - supply a single trace-propagation header pair for allow decisions,
//!   when a write key is configured.
//!
//! Without a write key the sink still logs locally but propagates nothing,
//! so downstream collectors see no half-configured traces.

use tracing::warn;
use uuid::Uuid;

use crate::domain::signed_request::VerificationError;

/// Header name for the propagated trace context.
pub const TRACE_HEADER: &str = "X-Honeycomb-Trace";

/// Dataset tag marshaled into propagated trace values.
const DATASET: &str = "rollgate";

/// Observability sink, shared process-wide.
pub struct ObservabilitySink {
    write_key: Option<String>,
}

impl ObservabilitySink {
    /// Create a sink. `write_key == None` disables trace propagation.
    pub fn new(write_key: Option<String>) -> Self {
        Self { write_key }
    }

    /// Whether trace propagation is configured.
    pub fn is_enabled(&self) -> bool {
        self.write_key.is_some()
    }

    /// Produce a per-request trace-propagation header pair, or `None` when
    /// no write key is configured.
    pub fn trace_propagation_header(&self) -> Option<(String, String)> {
        self.write_key.as_ref()?;

        let trace_id = Uuid::new_v4().simple().to_string();
        Some((
            TRACE_HEADER.to_string(),
            format!("1;dataset={DATASET},trace_id={trace_id}"),
        ))
    }

    /// Record a verification rejection with full diagnostic context.
    ///
    /// The logged message includes detail (drift magnitudes, decode errors)
    /// that must never appear in the HTTP response.
    pub fn record_rejection(&self, error: &VerificationError) {
        warn!(
            reason = error.reason(),
            detail = %error,
            "request rejected during verification"
        );
    }
}
