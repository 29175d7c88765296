// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Gateway configuration, read once from the environment at process start
//! and treated as immutable for the life of the process.
//!
//! | Variable | Required | Meaning |
//! |----------|----------|---------|
//! | `DISCORD_PUBLIC_KEY` | yes | hex-encoded Ed25519 verification key |
//! | `DISCORD_CLIENT_ID` | yes | application client id for the principal |
//! | `ROLLGATE_EVALUATOR_URL` | yes | HTTP endpoint of the dice evaluator |
//! | `HONEYCOMB_API_KEY` | no | observability write key; sink is a no-op without it |
//! | `USAGE_PLAN_API_KEY` | no | static usage-plan key for gateway metering |
//! | `ROLLGATE_TOLERANCE_SECS` | no | timestamp tolerance window (default 300) |

use std::time::Duration;
use thiserror::Error;

/// Default timestamp tolerance window: 5 minutes.
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {message}")]
    InvalidVar { var: &'static str, message: String },
}

/// Immutable process-wide configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Hex-encoded Ed25519 public verification key.
    pub public_key_hex: String,

    /// Application client id, bound into the policy principal.
    pub client_id: String,

    /// Endpoint of the external dice evaluator.
    pub evaluator_url: String,

    /// Observability write key. `None` disables trace propagation.
    pub honeycomb_api_key: Option<String>,

    /// Static usage-plan key attached to allow decisions.
    pub usage_plan_api_key: Option<String>,

    /// Maximum allowed absolute drift between request timestamp and now.
    pub tolerance: Duration,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingVar`] for absent required variables,
    /// [`ConfigError::InvalidVar`] for an unparseable tolerance.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tolerance_secs = match std::env::var("ROLLGATE_TOLERANCE_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidVar {
                var: "ROLLGATE_TOLERANCE_SECS",
                message: e.to_string(),
            })?,
            Err(_) => DEFAULT_TOLERANCE_SECS,
        };

        Ok(Self {
            public_key_hex: require("DISCORD_PUBLIC_KEY")?,
            client_id: require("DISCORD_CLIENT_ID")?,
            evaluator_url: require("ROLLGATE_EVALUATOR_URL")?,
            honeycomb_api_key: optional("HONEYCOMB_API_KEY"),
            usage_plan_api_key: optional("USAGE_PLAN_API_KEY"),
            tolerance: Duration::from_secs(tolerance_secs),
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}
