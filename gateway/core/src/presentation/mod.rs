// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`rollgate-core`)
//!
//! HTTP surface that translates webhook deliveries into application service
//! calls. **No business logic lives here** — all real work is delegated to
//! application services in `crate::application`.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /interactions` | signed interaction webhook (handshake + commands) |
//! | `POST /authorize` | gateway authorization decision for a signed request |
//! | `GET /healthz` | liveness probe |

pub mod api;
