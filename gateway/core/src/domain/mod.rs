// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod signed_request;
pub mod interaction;
pub mod evaluator;
pub mod policy;
pub mod gateway_config;
