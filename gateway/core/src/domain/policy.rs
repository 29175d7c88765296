// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Authorization Policy
//!
//! Decision document handed to the hosting gateway's access-control layer
//! after a request authenticates. Field names serialize exactly as the
//! gateway expects (`principalId`, `policyDocument`, IAM-style capitalised
//! statement keys), so the serde renames here are part of the wire contract.
//!
//! One decision per request. No caching, no retry.

use serde::{Deserialize, Serialize};

/// Outcome of an authorization request.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthDecision {
    /// Request authenticated; the gateway should apply this policy.
    Allowed(GatewayPolicy),
    /// Request rejected, with the non-leaking reason for the 401 body.
    Denied { reason: &'static str },
}

/// IAM-style policy document with principal, allow statement, and optional
/// trace/usage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPolicy {
    pub principal_id: String,

    pub policy_document: PolicyDocument,

    /// Trace-propagation pair supplied by the observability sink, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<TraceContext>,

    /// Static usage-plan key so the gateway can meter usage, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_identifier_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,

    #[serde(rename = "Statement")]
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(rename = "Action")]
    pub action: String,

    #[serde(rename = "Effect")]
    pub effect: String,

    #[serde(rename = "Resource")]
    pub resource: String,
}

/// Single trace-propagation header name/value pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceContext {
    pub honeycomb_header: String,
    pub honeycomb_value: String,
}

impl GatewayPolicy {
    /// Build an allow decision for `resource`, bound to the configured
    /// application client id.
    pub fn allow(client_id: &str, resource: &str) -> Self {
        Self {
            principal_id: format!("DiscordBot|{client_id}"),
            policy_document: PolicyDocument {
                version: "2012-10-17".to_string(),
                statement: vec![PolicyStatement {
                    action: "execute-api:Invoke".to_string(),
                    effect: "Allow".to_string(),
                    resource: resource.to_string(),
                }],
            },
            context: None,
            usage_identifier_key: None,
        }
    }
}
