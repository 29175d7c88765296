// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Ed25519 Request Verifier
//!
//! Infrastructure implementation of
//! [`crate::domain::signed_request::RequestVerifier`] using `ed25519-dalek`.
//!
//! ## Check Order
//!
//! 1. **Timestamp freshness** — parse the header as floating-point Unix
//!    epoch seconds and compare absolute drift against the tolerance window.
//!    The comparison is symmetric (past and future drift are treated alike)
//!    and strict: drift equal to the tolerance passes, drift greater fails.
//! 2. **Signature** — hex-decode the 64-byte signature and verify it over
//!    the UTF-8 bytes of `timestamp ++ body` with no separator.
//!
//! The timestamp check is cheap and runs first so replayed or skewed
//! requests never pay for a curve operation. Both checks gate the request.
//!
//! ## Security
//!
//! The verification key is injected at construction and never mutated.
//! Structured drift diagnostics are emitted on every verification, success
//! or failure, and never influence the decision.

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::domain::signed_request::{RequestVerifier, SignedRequest, VerificationError};

/// Errors constructing a verifier from configured key material.
#[derive(Debug, Error)]
pub enum VerifierKeyError {
    #[error("Public key is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Public key must be 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("Invalid Ed25519 public key: {0}")]
    InvalidKey(String),
}

/// Verifies signed webhook deliveries against the process-wide public key.
pub struct Ed25519RequestVerifier {
    verifying_key: VerifyingKey,
    tolerance_secs: f64,
}

impl Ed25519RequestVerifier {
    /// Build a verifier from a hex-encoded public key and tolerance window.
    ///
    /// # Errors
    ///
    /// [`VerifierKeyError`] when the key is not 32 bytes of valid hex or not
    /// a valid curve point.
    pub fn from_hex(public_key_hex: &str, tolerance: Duration) -> Result<Self, VerifierKeyError> {
        let key_bytes = hex::decode(public_key_hex.trim())?;
        let key_bytes: [u8; 32] = key_bytes
            .try_into()
            .map_err(|v: Vec<u8>| VerifierKeyError::InvalidLength(v.len()))?;

        let verifying_key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| VerifierKeyError::InvalidKey(e.to_string()))?;

        Ok(Self {
            verifying_key,
            tolerance_secs: tolerance.as_secs_f64(),
        })
    }

    fn check_timestamp(
        &self,
        timestamp: &str,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        let now_secs = now.timestamp_millis() as f64 / 1000.0;

        let submitted: f64 = match timestamp.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                debug!(
                    timestamp,
                    now = now_secs,
                    tolerance = self.tolerance_secs,
                    "request timestamp is not numeric"
                );
                return Err(VerificationError::BadTimestamp(format!(
                    "unparseable timestamp {timestamp:?}"
                )));
            }
        };

        // "nan"/"inf" parse successfully as f64; a NaN drift would slip
        // through the strict comparison below, so reject non-finite values
        // outright.
        if !submitted.is_finite() {
            debug!(
                timestamp,
                now = now_secs,
                tolerance = self.tolerance_secs,
                "request timestamp is not finite"
            );
            return Err(VerificationError::BadTimestamp(format!(
                "non-finite timestamp {timestamp:?}"
            )));
        }

        let drift = (now_secs - submitted).abs();
        debug!(
            timestamp = submitted,
            now = now_secs,
            drift,
            tolerance = self.tolerance_secs,
            "request timestamp freshness"
        );

        if drift > self.tolerance_secs {
            return Err(VerificationError::BadTimestamp(format!(
                "drift {drift:.3}s exceeds tolerance {:.0}s",
                self.tolerance_secs
            )));
        }

        Ok(())
    }

    fn check_signature(&self, request: &SignedRequest) -> Result<(), VerificationError> {
        let decoded = hex::decode(&request.signature_hex).map_err(|e| {
            VerificationError::BadSignature(format!("invalid hex signature: {e}"))
        })?;

        let sig_bytes: [u8; 64] = decoded.try_into().map_err(|v: Vec<u8>| {
            VerificationError::BadSignature(format!(
                "signature must be 64 bytes, got {}",
                v.len()
            ))
        })?;

        let signature = Signature::from_bytes(&sig_bytes);
        let message = format!("{}{}", request.timestamp, request.body);

        self.verifying_key
            .verify(message.as_bytes(), &signature)
            .map_err(|e| VerificationError::BadSignature(format!("verification failed: {e}")))
    }
}

impl RequestVerifier for Ed25519RequestVerifier {
    fn verify(&self, request: &SignedRequest, now: DateTime<Utc>) -> Result<(), VerificationError> {
        self.check_timestamp(&request.timestamp, now)?;
        self.check_signature(request)
    }
}
