// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Rollgate Gateway Daemon
//!
//! The `rollgate` binary serves the signed-webhook gateway for the dice bot.
//!
//! ## Endpoints
//!
//! - `POST /interactions` - authenticated interaction webhook
//! - `POST /authorize` - gateway authorization decisions
//! - `GET /healthz` - liveness probe
//!
//! Key material and collaborator endpoints come from the environment (see
//! `GatewayConfig`); they are read once at startup and immutable afterwards.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use rollgate_core::application::authorizer::AuthorizerService;
use rollgate_core::application::dispatch::InteractionDispatchService;
use rollgate_core::domain::gateway_config::GatewayConfig;
use rollgate_core::infrastructure::evaluator::HttpDiceEvaluator;
use rollgate_core::infrastructure::observability::ObservabilitySink;
use rollgate_core::infrastructure::verifier::Ed25519RequestVerifier;
use rollgate_core::presentation::api;

/// Rollgate - signed webhook gateway for the dice bot
#[derive(Parser)]
#[command(name = "rollgate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// HTTP listen host
    #[arg(long, env = "ROLLGATE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// HTTP listen port
    #[arg(long, env = "ROLLGATE_PORT", default_value = "8000")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ROLLGATE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let config = GatewayConfig::from_env().context("Failed to load gateway configuration")?;

    let verifier = Arc::new(
        Ed25519RequestVerifier::from_hex(&config.public_key_hex, config.tolerance)
            .context("Invalid DISCORD_PUBLIC_KEY")?,
    );
    let sink = Arc::new(ObservabilitySink::new(config.honeycomb_api_key.clone()));
    let evaluator = Arc::new(HttpDiceEvaluator::new(config.evaluator_url.clone()));

    let dispatch = Arc::new(InteractionDispatchService::new(
        verifier.clone(),
        evaluator,
        sink.clone(),
    ));
    let authorizer = Arc::new(AuthorizerService::new(
        verifier,
        sink,
        config.client_id.clone(),
        config.usage_plan_api_key.clone(),
    ));

    let app = api::app(dispatch, authorizer);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        addr = %addr,
        tolerance_secs = config.tolerance.as_secs(),
        trace_propagation = config.honeycomb_api_key.is_some(),
        "rollgate gateway listening"
    );

    axum::serve(listener, app)
        .await
        .context("Gateway server failed")?;

    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
