// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the bridge front end.

use crate::error::{AppError, Result};
use crate::models::{DesignSynthesis, DesignTeam, ExportReport, ImportPreview, ImportReport};
use crate::services::geodesignhub::EXPECTED_SYSTEMS;
use crate::services::messages::LogEntry;
use crate::services::{ExportDesign, ImportScenario};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/project", get(get_project))
        .route("/api/teams", get(get_teams))
        .route("/api/teams/{team_id}/designs", get(get_team_designs))
        .route("/api/import/preview", post(preview_import))
        .route("/api/import", post(import_scenario))
        .route("/api/export", post(export_design))
        .route("/api/messages", get(get_messages))
}

/// Reject a request body that fails its declared validation rules.
fn validate<T: Validate>(body: &T) -> Result<()> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string().replace('\n', "; ")))
}

// ─── Project ─────────────────────────────────────────────────

/// One GeoPlanner system and the Geodesignhub system it maps to.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SystemMapping {
    pub code: u32,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub gdh_system_id: Option<u64>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProjectResponse {
    pub project_id: String,
    pub systems: Vec<SystemMapping>,
    /// GeoPlanner layer holding climate action features.
    pub actions_layer_id: u32,
    /// GeoPlanner area-of-interest layer, for the scenario item the front end creates.
    pub aoi_layer_id: u32,
}

/// Verify the Geodesignhub project is ready for migrations.
async fn get_project(State(state): State<Arc<AppState>>) -> Result<Json<ProjectResponse>> {
    let resolver = state.gdh.verify_project().await?;

    let systems = EXPECTED_SYSTEMS
        .iter()
        .map(|(code, name, _)| SystemMapping {
            code: code.0,
            name: name.to_string(),
            gdh_system_id: resolver.resolve(*code),
        })
        .collect();

    Ok(Json(ProjectResponse {
        project_id: state.gdh.project_id().to_string(),
        systems,
        actions_layer_id: state.config.gpl.actions_layer_id,
        aoi_layer_id: state.config.gpl.aoi_layer_id,
    }))
}

// ─── Teams and designs ───────────────────────────────────────

async fn get_teams(State(state): State<Arc<AppState>>) -> Result<Json<Vec<DesignTeam>>> {
    Ok(Json(state.gdh.get_design_teams().await?))
}

async fn get_team_designs(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<u64>,
) -> Result<Json<Vec<DesignSynthesis>>> {
    Ok(Json(state.gdh.get_team_designs(team_id).await?))
}

// ─── Import ──────────────────────────────────────────────────

/// GeoPlanner scenario to import.
#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ImportRequest {
    #[validate(url)]
    pub feature_service_url: String,
    #[validate(length(min = 1))]
    pub scenario_id: String,
}

impl From<ImportRequest> for ImportScenario {
    fn from(req: ImportRequest) -> Self {
        ImportScenario {
            feature_service_url: req.feature_service_url,
            scenario_id: req.scenario_id.trim().to_string(),
        }
    }
}

async fn preview_import(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportPreview>> {
    validate(&req)?;
    let scenario = ImportScenario::from(req);
    Ok(Json(state.migrations.preview_import(&scenario).await?))
}

async fn import_scenario(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportReport>> {
    validate(&req)?;
    let scenario = ImportScenario::from(req);
    Ok(Json(state.migrations.import_scenario(&scenario).await?))
}

// ─── Export ──────────────────────────────────────────────────

/// Geodesignhub design to export into an already-created scenario.
#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExportRequest {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub team_id: u64,
    #[validate(length(min = 1))]
    pub design_id: String,
    #[validate(url)]
    pub feature_service_url: String,
    #[validate(length(min = 1))]
    pub scenario_id: String,
}

async fn export_design(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> Result<Json<ExportReport>> {
    validate(&req)?;
    let export = ExportDesign {
        team_id: req.team_id,
        design_id: req.design_id.trim().to_string(),
        feature_service_url: req.feature_service_url,
        scenario_id: req.scenario_id.trim().to_string(),
    };
    Ok(Json(state.migrations.export_design(&export).await?))
}

// ─── Messages ────────────────────────────────────────────────

async fn get_messages(State(state): State<Arc<AppState>>) -> Json<Vec<LogEntry>> {
    Json(state.messages.entries())
}
