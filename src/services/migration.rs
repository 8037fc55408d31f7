// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Migration workflows.
//!
//! Import (GeoPlanner scenario → Geodesignhub design):
//! 1. Count and page through the scenario's action features
//! 2. Drop features that cannot become diagrams
//! 3. Map the rest to diagram submissions
//! 4. Verify the Geodesignhub project and resolve systems
//! 5. Submit diagrams one by one
//!
//! Export (Geodesignhub design → GeoPlanner scenario):
//! 1. Fetch the design as Esri JSON
//! 2. Map diagrams to scenario features
//! 3. Add them to the scenario's actions layer

use crate::config::{Config, FieldRole, GplConfig};
use crate::error::Result;
use crate::models::{
    AddFeaturesOutcome, DiagramSubmission, EsriDiagramRecord, ExportReport, GplFeature,
    ImportPreview, ImportReport, ScenarioScope,
};
use crate::services::feature_service::{fetch_all_features, FeatureServiceClient, FeatureSource};
use crate::services::geodesignhub::GeodesignhubClient;
use crate::services::mapping::{inbound, outbound};
use crate::services::messages::MessageLog;
use crate::services::submission::submit_diagrams;
use std::time::Duration;

/// Source scenario of an import.
#[derive(Debug, Clone)]
pub struct ImportScenario {
    /// Feature service backing the scenario's portal item.
    pub feature_service_url: String,
    pub scenario_id: String,
}

/// Target of an export: a design and the already-created scenario receiving it.
#[derive(Debug, Clone)]
pub struct ExportDesign {
    pub team_id: u64,
    pub design_id: String,
    pub feature_service_url: String,
    pub scenario_id: String,
}

/// Runs imports and exports against one Geodesignhub project and one
/// GeoPlanner project.
#[derive(Clone)]
pub struct MigrationService {
    gdh: GeodesignhubClient,
    gpl_project_id: String,
    arcgis_token: String,
    timeout: Duration,
    gpl: GplConfig,
    messages: MessageLog,
}

impl MigrationService {
    pub fn new(config: &Config, gdh: GeodesignhubClient, messages: MessageLog) -> Self {
        Self {
            gdh,
            gpl_project_id: config.gpl_project_id.clone(),
            arcgis_token: config.arcgis_token.clone(),
            timeout: Duration::from_secs(config.http_timeout_secs),
            gpl: config.gpl.clone(),
            messages,
        }
    }

    fn actions_layer(&self, service_url: &str) -> Result<FeatureServiceClient> {
        FeatureServiceClient::new(
            service_url,
            self.gpl.actions_layer_id,
            self.arcgis_token.clone(),
            self.timeout,
        )
    }

    /// Count the features of a scenario that carry climate actions.
    pub async fn preview_import(&self, scenario: &ImportScenario) -> Result<ImportPreview> {
        let scope = ScenarioScope::new(self.gpl_project_id.as_str(), scenario.scenario_id.as_str());
        let layer = self.actions_layer(&scenario.feature_service_url)?;

        let feature_count = layer
            .query_count(&scope.filter_with_actions(&self.gpl))
            .await
            .inspect_err(|e| self.messages.error(format!("Counting features failed: {}", e)))?;

        self.messages.info(format!(
            "Scenario {} has {} features with climate actions",
            scenario.scenario_id, feature_count
        ));
        Ok(ImportPreview {
            scenario_id: scenario.scenario_id.clone(),
            feature_count,
        })
    }

    /// Import a GeoPlanner scenario into Geodesignhub as new diagrams.
    pub async fn import_scenario(&self, scenario: &ImportScenario) -> Result<ImportReport> {
        tracing::info!(scenario_id = %scenario.scenario_id, "Starting import");

        let messages = self.messages.scoped();
        match self.run_import(scenario, &messages).await {
            Ok(mut report) => {
                report.messages = messages.entries();
                Ok(report)
            }
            Err(e) => {
                messages.error(format!(
                    "Import of scenario {} failed: {}",
                    scenario.scenario_id, e
                ));
                Err(e)
            }
        }
    }

    async fn run_import(
        &self,
        scenario: &ImportScenario,
        messages: &MessageLog,
    ) -> Result<ImportReport> {
        let scope = ScenarioScope::new(self.gpl_project_id.as_str(), scenario.scenario_id.as_str());
        let filter = scope.filter_with_actions(&self.gpl);
        let layer = self.actions_layer(&scenario.feature_service_url)?;

        let feature_count = layer.query_count(&filter).await?;
        messages.info(format!(
            "Fetching {} features from scenario {}",
            feature_count, scenario.scenario_id
        ));
        let features = fetch_all_features(&layer, &filter, feature_count).await?;

        let (submissions, features_skipped) =
            prepare_submissions(&features, &self.gpl, messages);

        let systems = self.gdh.verify_project().await?;
        let submission = submit_diagrams(&self.gdh, &systems, submissions, messages).await;

        tracing::info!(
            scenario_id = %scenario.scenario_id,
            feature_count,
            features_skipped,
            submitted = submission.submitted(),
            failed = submission.failed(),
            "Import complete"
        );

        Ok(ImportReport {
            feature_count,
            features_skipped,
            submission,
            messages: Vec::new(),
        })
    }

    /// Export a negotiated design into an existing GeoPlanner scenario.
    pub async fn export_design(&self, export: &ExportDesign) -> Result<ExportReport> {
        tracing::info!(
            team_id = export.team_id,
            design_id = %export.design_id,
            scenario_id = %export.scenario_id,
            "Starting export"
        );

        let messages = self.messages.scoped();
        match self.run_export(export, &messages).await {
            Ok(mut report) => {
                report.messages = messages.entries();
                Ok(report)
            }
            Err(e) => {
                messages.error(format!(
                    "Export of design {} failed: {}",
                    export.design_id, e
                ));
                Err(e)
            }
        }
    }

    async fn run_export(&self, export: &ExportDesign, messages: &MessageLog) -> Result<ExportReport> {
        let records = self
            .gdh
            .get_design_esri_json(export.team_id, &export.design_id)
            .await?;
        let diagram_count = records.len();
        messages.info(format!(
            "Design {} has {} diagrams",
            export.design_id, diagram_count
        ));

        let scope = ScenarioScope::new(self.gpl_project_id.as_str(), export.scenario_id.as_str());
        let features = prepare_features(&records, &scope, &self.gpl, messages);
        let diagrams_excluded = diagram_count - features.len();

        let added = if features.is_empty() {
            messages
                .warn(format!("Design {} has no diagrams to export", export.design_id));
            AddFeaturesOutcome::default()
        } else {
            let layer = self.actions_layer(&export.feature_service_url)?;
            layer.apply_edits(&features).await?
        };

        for failure in &added.failures {
            messages.warn(format!(
                "Feature {} was not added to scenario {}: {}",
                failure.index, export.scenario_id, failure.description
            ));
        }
        messages.info(format!(
            "Added {} features to scenario {}",
            added.object_ids.len(),
            export.scenario_id
        ));

        Ok(ExportReport {
            scenario_id: export.scenario_id.clone(),
            diagram_count,
            diagrams_excluded,
            added,
            messages: Vec::new(),
        })
    }
}

/// Map fetched features to diagram submissions, warning about each feature
/// that is left out. Returns the submissions and the number skipped.
pub fn prepare_submissions(
    features: &[geojson::Feature],
    gpl: &GplConfig,
    messages: &MessageLog,
) -> (Vec<DiagramSubmission>, usize) {
    let mut submissions = Vec::with_capacity(features.len());
    let mut skipped = 0;

    for (index, feature) in features.iter().enumerate() {
        if !outbound::has_actions(feature, gpl) {
            messages.warn(format!(
                "Skipping feature {} ({}): no climate action",
                index,
                feature_label(feature, gpl)
            ));
            skipped += 1;
            continue;
        }
        match outbound::map_feature(feature, gpl) {
            Ok(submission) => submissions.push(submission),
            Err(e) => {
                messages.warn(format!(
                    "Skipping feature {} ({}): {}",
                    index,
                    feature_label(feature, gpl),
                    e
                ));
                skipped += 1;
            }
        }
    }

    (submissions, skipped)
}

/// Map exported diagrams to scenario features. Non-polygon diagrams are
/// dropped quietly; unmappable ones are reported.
pub fn prepare_features(
    records: &[EsriDiagramRecord],
    scope: &ScenarioScope,
    gpl: &GplConfig,
    messages: &MessageLog,
) -> Vec<GplFeature> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match inbound::map_diagram(record, scope, gpl) {
            Ok(feature) => feature,
            Err(e) => {
                messages.warn(format!(
                    "Skipping diagram {} ({}): {}",
                    index,
                    record.attributes.description.as_deref().unwrap_or("untitled"),
                    e
                ));
                None
            }
        })
        .collect()
}

fn feature_label(feature: &geojson::Feature, gpl: &GplConfig) -> String {
    [FieldRole::Name, FieldRole::GlobalId]
        .into_iter()
        .find_map(|role| {
            feature
                .property(gpl.field(role))
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or("unnamed")
        .to_string()
}
