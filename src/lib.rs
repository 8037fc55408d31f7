// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Geodesign bridge: migrate designs between GeoPlanner and Geodesignhub
//!
//! This crate provides the backend API that moves GeoPlanner scenario
//! features into Geodesignhub as diagrams, and negotiated Geodesignhub
//! designs back into GeoPlanner scenarios.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use error::AppError;
use services::{GeodesignhubClient, MessageLog, MigrationService};
use std::time::Duration;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub gdh: GeodesignhubClient,
    pub migrations: MigrationService,
    pub messages: MessageLog,
}

impl AppState {
    /// Build the upstream clients described by `config`.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let gdh = GeodesignhubClient::new(
            &config.gdh_api_url,
            config.gdh_project_id.clone(),
            config.gdh_api_token.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?;
        let messages = MessageLog::new();
        let migrations = MigrationService::new(&config, gdh.clone(), messages.clone());

        Ok(Self {
            config,
            gdh,
            migrations,
            messages,
        })
    }
}
