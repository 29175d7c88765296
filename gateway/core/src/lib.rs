// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Rollgate core
//!
//! Request-authentication and interaction-dispatch core for the rollgate
//! dice-bot webhook gateway.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Implements signed-request verification, interaction
//!   dispatch, and gateway authorization decisions

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
