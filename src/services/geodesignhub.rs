// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geodesignhub API client.
//!
//! Handles:
//! - Project, system, team and design reads
//! - Design export as Esri JSON
//! - Diagram creation and property updates
//! - Project verification and system code resolution

use crate::error::AppError;
use crate::models::diagram::{CreateDiagramPayload, EsriDesignExport, TeamDesigns};
use crate::models::{
    DesignSynthesis, DesignTeam, DiagramProperties, EsriDiagramRecord, GdhProject, GdhSystem,
    SystemCode,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// The write half of the Geodesignhub API used by the submission sequencer.
pub trait DiagramSink {
    /// Create a project diagram under a Geodesignhub system; returns the new
    /// diagram ID.
    fn create_diagram(
        &self,
        system_id: u64,
        payload: &CreateDiagramPayload,
    ) -> impl Future<Output = Result<u64, AppError>> + Send;

    /// Replace the properties (tags, dates, metadata) of a diagram.
    fn update_diagram_properties(
        &self,
        diagram_id: u64,
        properties: &DiagramProperties,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Geodesignhub API client bound to one project.
#[derive(Clone)]
pub struct GeodesignhubClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    token: String,
}

impl GeodesignhubClient {
    pub fn new(
        base_url: &str,
        project_id: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
            token,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Get project info.
    pub async fn get_project(&self) -> Result<GdhProject, AppError> {
        self.get_json("").await
    }

    /// List the project's systems.
    pub async fn get_systems(&self) -> Result<Vec<GdhSystem>, AppError> {
        self.get_json("systems/").await
    }

    /// List the project's design teams.
    pub async fn get_design_teams(&self) -> Result<Vec<DesignTeam>, AppError> {
        self.get_json("cteams/").await
    }

    /// List the designs (syntheses) of a design team.
    pub async fn get_team_designs(&self, team_id: u64) -> Result<Vec<DesignSynthesis>, AppError> {
        let designs: TeamDesigns = self.get_json(&format!("cteams/{}/", team_id)).await?;
        Ok(designs.synthesis)
    }

    /// Get a negotiated design's diagrams as Esri JSON features.
    pub async fn get_design_esri_json(
        &self,
        team_id: u64,
        design_id: &str,
    ) -> Result<Vec<EsriDiagramRecord>, AppError> {
        let export: EsriDesignExport = self
            .get_json(&format!("cteams/{}/{}/esri/", team_id, design_id))
            .await?;
        Ok(export.into_records())
    }

    /// Verify the project is an esri workspace with the expected systems and
    /// build the system resolver for it.
    pub async fn verify_project(&self) -> Result<SystemResolver, AppError> {
        let project = self.get_project().await?;
        if project.external_connection.as_deref() != Some("esri") {
            return Err(AppError::ProjectNotReady(
                "The project is not an ESRI workspace project in Geodesignhub".to_string(),
            ));
        }

        let systems = self.get_systems().await?;
        let missing = missing_systems(&systems);
        if !missing.is_empty() {
            return Err(AppError::ProjectNotReady(format!(
                "Geodesignhub project is not set up correctly, missing systems: {}",
                missing.join(", ")
            )));
        }

        tracing::info!(
            project_id = %self.project_id,
            systems = systems.len(),
            "Geodesignhub project verified"
        );
        Ok(SystemResolver::new(systems))
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/projects/{}/{}", self.base_url, self.project_id, path)
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(self.project_url(path))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Geodesignhub(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Generic POST request with JSON body and response.
    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, AppError> {
        let response = self
            .http
            .post(self.project_url(path))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Geodesignhub(e.to_string()))?;

        self.check_response_json(response).await
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status.as_u16() == 401 {
            return Err(AppError::Geodesignhub(format!(
                "HTTP {}: {}",
                status,
                AppError::GDH_TOKEN_ERROR
            )));
        }

        if status.as_u16() == 400 {
            return Err(AppError::Geodesignhub(format!(
                "HTTP {}: {}",
                status,
                AppError::GDH_PROJECT_ERROR
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Geodesignhub(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Geodesignhub(format!("JSON parse error: {}", e)))
    }
}

impl DiagramSink for GeodesignhubClient {
    async fn create_diagram(
        &self,
        system_id: u64,
        payload: &CreateDiagramPayload,
    ) -> Result<u64, AppError> {
        let path = format!("systems/{}/add/project/", system_id);
        let body = self.post_json(&path, payload).await?;
        parse_diagram_id(&body)
    }

    async fn update_diagram_properties(
        &self,
        diagram_id: u64,
        properties: &DiagramProperties,
    ) -> Result<(), AppError> {
        self.post_json(&format!("diagrams/{}/", diagram_id), properties)
            .await?;
        Ok(())
    }
}

/// Read `diagram_id` from a create response. The API sometimes returns the
/// object JSON-encoded inside a string.
fn parse_diagram_id(body: &Value) -> Result<u64, AppError> {
    let decoded;
    let object = match body {
        Value::String(s) => {
            decoded = serde_json::from_str::<Value>(s).map_err(|e| {
                AppError::Geodesignhub(format!("Unparseable diagram response: {}", e))
            })?;
            &decoded
        }
        other => other,
    };

    let id = object.get("diagram_id").ok_or_else(|| {
        AppError::Geodesignhub(format!("No diagram_id in response: {}", object))
    })?;

    id.as_u64()
        .or_else(|| id.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| AppError::Geodesignhub(format!("Invalid diagram_id: {}", id)))
}

/// GeoPlanner system code → Geodesignhub system name and color.
pub const EXPECTED_SYSTEMS: [(SystemCode, &str, &str); 8] = [
    (SystemCode(1), "ENE", "#AB507E"),
    (SystemCode(2), "AG", "#D9CD91"),
    (SystemCode(3), "FOR", "#80BD75"),
    (SystemCode(4), "OCN", "#8CCDD1"),
    (SystemCode(5), "STL", "#E6564E"),
    (SystemCode(6), "IND", "#916DA3"),
    (SystemCode(7), "TRAN", "#706666"),
    (SystemCode(8), "WAT", "#6B9CB0"),
];

/// Names of expected systems absent from `systems` (matched on name and color).
fn missing_systems(systems: &[GdhSystem]) -> Vec<&'static str> {
    EXPECTED_SYSTEMS
        .iter()
        .filter(|(_, name, color)| {
            !systems
                .iter()
                .any(|s| s.sysname == *name && s.syscolor.eq_ignore_ascii_case(color))
        })
        .map(|(_, name, _)| *name)
        .collect()
}

/// Maps GeoPlanner system codes to the system IDs of one Geodesignhub project.
#[derive(Debug, Clone, Default)]
pub struct SystemResolver {
    ids: HashMap<SystemCode, u64>,
}

impl SystemResolver {
    /// Build from the project's systems. A name matching zero or several
    /// systems leaves its code unresolved.
    pub fn new(systems: Vec<GdhSystem>) -> Self {
        let ids = EXPECTED_SYSTEMS
            .iter()
            .filter_map(|(code, name, _)| {
                let mut matching = systems.iter().filter(|s| s.sysname == *name);
                match (matching.next(), matching.next()) {
                    (Some(system), None) => Some((*code, system.id)),
                    _ => None,
                }
            })
            .collect();
        Self { ids }
    }

    /// Geodesignhub system ID for a GeoPlanner system code.
    pub fn resolve(&self, code: SystemCode) -> Option<u64> {
        self.ids.get(&code).copied()
    }
}
