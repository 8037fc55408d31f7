// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geodesign Bridge API Server
//!
//! Migrates geodesign data between GeoPlanner scenarios and Geodesignhub
//! designs.

use geodesign_bridge::{config::Config, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Geodesign Bridge API");
    tracing::info!(
        gdh_api_url = %config.gdh_api_url,
        gdh_project_id = %config.gdh_project_id,
        gpl_project_id = %config.gpl_project_id,
        coefficients = config.gpl.coefficient_fields.len(),
        timeout_secs = config.http_timeout_secs,
        "Configuration loaded"
    );

    // Build shared state
    let state = Arc::new(AppState::new(config.clone())?);

    // Build router
    let app = geodesign_bridge::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("geodesign_bridge=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
