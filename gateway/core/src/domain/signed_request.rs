// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Signed Request Model
//!
//! Domain model for an inbound webhook request and its authentication
//! material. The chat platform signs every delivery with an Ed25519 key pair;
//! the signature covers the concatenation of the timestamp header and the raw
//! request body, with no separator.
//!
//! ## Verification Pipeline
//!
//! ```text
//! SignedRequest (raw body + signature hex + timestamp string)
//!   └─ RequestVerifier::verify(&request, now)
//!         └─ timestamp freshness window   ← checked first (cheap)
//!         └─ Ed25519 signature            ← checked second
//! ```
//!
//! ## Invariants
//!
//! - `body` is the **exact** UTF-8 text the platform signed. Parsing into an
//!   interaction envelope happens only after verification succeeds.
//! - Both checks gate the request; the timestamp-first ordering is a cost
//!   optimisation, not a correctness requirement.
//!
//! ## Anti-Corruption Layer
//!
//! [`RequestVerifier`] keeps the domain layer free of `ed25519-dalek`. The
//! infrastructure implementation lives in
//! [`crate::infrastructure::verifier`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One inbound webhook delivery, request-scoped.
///
/// Missing headers are represented as empty strings; they fail verification
/// through the normal error paths rather than a separate code path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Raw UTF-8 request body, exactly as delivered.
    pub body: String,

    /// Hex-encoded Ed25519 signature from the signature header.
    pub signature_hex: String,

    /// Decimal Unix-epoch-seconds string from the timestamp header.
    pub timestamp: String,
}

/// Errors from signature/timestamp verification.
///
/// The payload string is diagnostic detail for the observability sink only.
/// Callers returning an HTTP response must use [`VerificationError::reason`],
/// which never leaks internals.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum VerificationError {
    /// The timestamp header was unparseable or outside the tolerance window.
    #[error("Bad timestamp: {0}")]
    BadTimestamp(String),

    /// The signature was malformed or did not verify against the gateway key.
    #[error("Bad signature: {0}")]
    BadSignature(String),
}

impl VerificationError {
    /// Minimal, non-leaking reason string for the 401 response body.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::BadTimestamp(_) => "Bad timestamp.",
            Self::BadSignature(_) => "Bad signature.",
        }
    }
}

/// Domain-level abstraction over request authentication.
///
/// Implementations **must** run the timestamp freshness check before the
/// cryptographic check, and must not let diagnostic logging influence the
/// verification outcome.
pub trait RequestVerifier: Send + Sync {
    /// Verify `request` against the process-wide public key at time `now`.
    ///
    /// # Errors
    ///
    /// - [`VerificationError::BadTimestamp`] — unparseable timestamp or
    ///   absolute drift strictly greater than the tolerance window
    /// - [`VerificationError::BadSignature`] — malformed hex, wrong length,
    ///   or cryptographic mismatch
    fn verify(&self, request: &SignedRequest, now: DateTime<Utc>) -> Result<(), VerificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_strings_match_the_platform_contract() {
        assert_eq!(
            VerificationError::BadTimestamp("drift 1000s".into()).reason(),
            "Bad timestamp."
        );
        assert_eq!(
            VerificationError::BadSignature("hex".into()).reason(),
            "Bad signature."
        );
    }
}
