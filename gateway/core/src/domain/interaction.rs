// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Interaction Envelope
//!
//! Model of the chat platform's interaction payload. Only two variants are
//! recognised:
//!
//! | `type` | Meaning | Handling |
//! |--------|---------|----------|
//! | 1 | Handshake ping (liveness probe) | fixed acknowledgment |
//! | 2 | Slash-command invocation | dice expression dispatch |
//!
//! Any other value is a protocol mismatch and is treated as a server fault,
//! not a user error.
//!
//! ## Lenient Extraction
//!
//! Routing reads **only** the `type` field; sibling fields of any shape never
//! affect classification. Command fields are navigated from the raw JSON
//! value per access, so a missing or wrong-shaped `member`/`user`/`data`
//! surfaces as a user-visible [`InteractionError`] message rather than a
//! parse failure.

use serde_json::Value;
use thiserror::Error;

/// Routing classification of an envelope's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// Type 1 — handshake ping.
    Ping,
    /// Type 2 — slash-command invocation.
    Command,
    /// Any other, non-integer, or absent type value. Carried for diagnostics.
    Unhandled(Option<i64>),
}

/// A parsed slash-command: who invoked it, and the raw option text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Invoking user's display name.
    pub user: String,
    /// The free-text option value, as submitted (untrimmed).
    pub expression: String,
}

/// Structural failures while extracting command fields. A field that is
/// present but of an unusable shape is reported the same as an absent one.
///
/// Surfaced to the end user identically to evaluator failures (status 200
/// with the message as content).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

/// Top-level interaction payload, kept as raw JSON.
#[derive(Debug, Clone)]
pub struct InteractionEnvelope {
    payload: Value,
}

impl InteractionEnvelope {
    /// Parse a raw request body. Any JSON document is accepted here;
    /// classification and field extraction are deferred to the accessors.
    ///
    /// # Errors
    ///
    /// Only when the body is not JSON at all.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            payload: serde_json::from_str(body)?,
        })
    }

    /// Classify the envelope's `type` field for routing.
    ///
    /// Reads nothing but `type`, so unexpected sibling fields can never
    /// change how an envelope routes.
    pub fn kind(&self) -> InteractionKind {
        match self.payload.get("type").and_then(Value::as_i64) {
            Some(1) => InteractionKind::Ping,
            Some(2) => InteractionKind::Command,
            other => InteractionKind::Unhandled(other),
        }
    }

    /// Extract the invoking user's display name and the first option value.
    ///
    /// The user comes from `member.user` (guild channels) or the top-level
    /// `user` (DMs), preferring `global_name` over `username`.
    ///
    /// # Errors
    ///
    /// [`InteractionError::MissingField`] when the envelope lacks a usable
    /// user, command data, or first option — including fields that exist but
    /// have the wrong shape.
    pub fn command(&self) -> Result<CommandInvocation, InteractionError> {
        let user = self
            .payload
            .get("member")
            .and_then(|member| member.get("user"))
            .or_else(|| self.payload.get("user"))
            .ok_or(InteractionError::MissingField("member.user"))?;

        let display_name = user
            .get("global_name")
            .and_then(Value::as_str)
            .or_else(|| user.get("username").and_then(Value::as_str))
            .ok_or(InteractionError::MissingField("member.user.username"))?
            .to_string();

        let option = self
            .payload
            .get("data")
            .ok_or(InteractionError::MissingField("data"))?
            .get("options")
            .and_then(|options| options.get(0))
            .ok_or(InteractionError::MissingField("data.options[0]"))?;

        let expression = match option.get("value") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                return Err(InteractionError::MissingField("data.options[0].value"))
            }
            // The platform may deliver non-string option types.
            Some(other) => other.to_string(),
        };

        Ok(CommandInvocation {
            user: display_name,
            expression,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> InteractionEnvelope {
        InteractionEnvelope::from_json(body).expect("test envelope must parse")
    }

    #[test]
    fn ping_envelope_ignores_extra_fields() {
        let envelope = parse(r#"{"type":1,"id":"123","application_id":"456"}"#);
        assert_eq!(envelope.kind(), InteractionKind::Ping);
    }

    #[test]
    fn routing_is_untouched_by_wrong_shaped_siblings() {
        let ping = parse(r#"{"type":1,"member":"oops","data":42}"#);
        assert_eq!(ping.kind(), InteractionKind::Ping);

        let command = parse(r#"{"type":2,"member":"oops","user":7,"data":"nope"}"#);
        assert_eq!(command.kind(), InteractionKind::Command);
    }

    #[test]
    fn unknown_missing_or_non_integer_types_are_unhandled() {
        assert_eq!(
            parse(r#"{"type":3}"#).kind(),
            InteractionKind::Unhandled(Some(3))
        );
        assert_eq!(
            parse(r#"{"token":"t"}"#).kind(),
            InteractionKind::Unhandled(None)
        );
        assert_eq!(
            parse(r#"{"type":"2"}"#).kind(),
            InteractionKind::Unhandled(None)
        );
    }

    #[test]
    fn command_extracts_guild_member_user() {
        let envelope = parse(
            r#"{
                "type": 2,
                "member": {"user": {"username": "alice", "global_name": "Alice"}},
                "data": {"name": "roll", "options": [{"value": "4d6"}]}
            }"#,
        );
        let invocation = envelope.command().unwrap();
        assert_eq!(invocation.user, "Alice");
        assert_eq!(invocation.expression, "4d6");
    }

    #[test]
    fn command_falls_back_to_username_then_dm_user() {
        let no_global = parse(
            r#"{
                "type": 2,
                "member": {"user": {"username": "alice"}},
                "data": {"options": [{"value": "1d20"}]}
            }"#,
        );
        assert_eq!(no_global.command().unwrap().user, "alice");

        let dm = parse(
            r#"{
                "type": 2,
                "user": {"username": "bob"},
                "data": {"options": [{"value": "1d20"}]}
            }"#,
        );
        assert_eq!(dm.command().unwrap().user, "bob");
    }

    #[test]
    fn command_accepts_non_string_option_values() {
        let envelope = parse(
            r#"{
                "type": 2,
                "user": {"username": "bob"},
                "data": {"options": [{"value": 20}]}
            }"#,
        );
        assert_eq!(envelope.command().unwrap().expression, "20");
    }

    #[test]
    fn command_reports_missing_fields() {
        let no_user = parse(r#"{"type":2,"data":{"options":[{"value":"4d6"}]}}"#);
        assert_eq!(
            no_user.command(),
            Err(InteractionError::MissingField("member.user"))
        );

        let no_data = parse(r#"{"type":2,"user":{"username":"bob"}}"#);
        assert_eq!(
            no_data.command(),
            Err(InteractionError::MissingField("data"))
        );

        let no_options = parse(r#"{"type":2,"user":{"username":"bob"},"data":{"options":[]}}"#);
        assert_eq!(
            no_options.command(),
            Err(InteractionError::MissingField("data.options[0]"))
        );

        let no_value = parse(r#"{"type":2,"user":{"username":"bob"},"data":{"options":[{}]}}"#);
        assert_eq!(
            no_value.command(),
            Err(InteractionError::MissingField("data.options[0].value"))
        );
    }

    #[test]
    fn command_reports_wrong_shaped_fields_like_missing_ones() {
        let string_member = parse(r#"{"type":2,"member":"oops","data":{"options":[{"value":"4d6"}]}}"#);
        assert_eq!(
            string_member.command(),
            Err(InteractionError::MissingField("member.user"))
        );

        let numeric_username = parse(
            r#"{"type":2,"user":{"username":42},"data":{"options":[{"value":"4d6"}]}}"#,
        );
        assert_eq!(
            numeric_username.command(),
            Err(InteractionError::MissingField("member.user.username"))
        );

        let string_data = parse(r#"{"type":2,"user":{"username":"bob"},"data":"nope"}"#);
        assert_eq!(
            string_data.command(),
            Err(InteractionError::MissingField("data.options[0]"))
        );
    }
}
