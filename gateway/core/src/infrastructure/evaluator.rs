// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP adapter for the external dice evaluator.
//!
//! The evaluator is an opaque collaborator: it receives an expression and
//! returns either a result or a descriptive failure. This adapter speaks a
//! small JSON protocol to it:
//!
//! - request: `POST {url}` with `{"expression": "4d6"}`
//! - success: `{"result": 18}` (string or number)
//! - failure: `{"error": "Unknown die size"}`
//!
//! Transport failures surface as [`EvaluationError`] like any other
//! evaluator failure, since the end user is shown the message either way.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::evaluator::{DiceEvaluator, EvaluationError};

#[derive(Debug, Serialize)]
struct EvaluateRequest<'a> {
    expression: &'a str,
}

#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Dice evaluator reached over HTTP.
pub struct HttpDiceEvaluator {
    endpoint: String,
    client: Client,
}

impl HttpDiceEvaluator {
    /// Create an evaluator client for the configured endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl DiceEvaluator for HttpDiceEvaluator {
    async fn evaluate(&self, expression: &str) -> Result<String, EvaluationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EvaluateRequest { expression })
            .send()
            .await
            .map_err(|e| EvaluationError(format!("dice evaluator unreachable: {e}")))?;

        let body: EvaluateResponse = response
            .json()
            .await
            .map_err(|e| EvaluationError(format!("dice evaluator returned malformed output: {e}")))?;

        if let Some(message) = body.error {
            return Err(EvaluationError(message));
        }

        match body.result {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Ok(other.to_string()),
            None => Err(EvaluationError(
                "dice evaluator returned no result".to_string(),
            )),
        }
    }
}
