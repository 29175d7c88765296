// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Dice evaluator boundary.
//!
//! The dice-expression grammar and engine are an external collaborator; this
//! trait is the only thing the core knows about them. Failures carry a single
//! message string that is surfaced verbatim to the end user.

use async_trait::async_trait;
use thiserror::Error;

/// Opaque failure from the external evaluator.
///
/// All evaluator failures are treated uniformly: the message is shown to the
/// user as-is, none is distinguished by kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EvaluationError(pub String);

/// External dice-expression evaluator.
#[async_trait]
pub trait DiceEvaluator: Send + Sync {
    /// Evaluate a trimmed, non-empty dice expression.
    ///
    /// # Errors
    ///
    /// [`EvaluationError`] with a user-facing description of the failure.
    async fn evaluate(&self, expression: &str) -> Result<String, EvaluationError>;
}
