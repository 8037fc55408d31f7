// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoPlanner-side records: scenario scope and feature attributes.

use crate::config::{FieldRole, GplConfig};
use crate::models::diagram::EsriGeometry;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Scoping attribute holding the GeoPlanner project ID.
pub const PROJECT_ID_FIELD: &str = "Geodesign_ProjectID";
/// Scoping attribute holding the GeoPlanner scenario ID.
pub const SCENARIO_ID_FIELD: &str = "Geodesign_ScenarioID";

/// Project + scenario pair that scopes every GeoPlanner feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioScope {
    pub project_id: String,
    pub scenario_id: String,
}

impl ScenarioScope {
    pub fn new(project_id: impl Into<String>, scenario_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            scenario_id: scenario_id.into(),
        }
    }

    /// `where` clause selecting this scenario's features.
    pub fn filter(&self) -> String {
        format!(
            "({} = '{}') AND ({} = '{}')",
            PROJECT_ID_FIELD,
            sql_quote(&self.project_id),
            SCENARIO_ID_FIELD,
            sql_quote(&self.scenario_id)
        )
    }

    /// Scenario filter restricted to features that carry at least one action.
    pub fn filter_with_actions(&self, gpl: &GplConfig) -> String {
        format!(
            "{} AND ({} IS NOT NULL)",
            self.filter(),
            gpl.field(FieldRole::ActionIds)
        )
    }
}

/// Escape a value for a single-quoted SQL-92 literal.
fn sql_quote(value: &str) -> String {
    value.replace('\'', "''")
}

/// Attributes of a feature headed for a GeoPlanner scenario.
///
/// Field names are only attached when the record is serialized with
/// [`FeatureAttributes::to_attributes`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureAttributes {
    pub scope: ScenarioScope,
    /// GLOBAL_ID of the GeoPlanner feature this diagram came from, if any.
    pub source_id: Option<String>,
    pub name: Option<String>,
    pub action_id: String,
    pub action_ids: String,
    /// Epoch milliseconds.
    pub start_date: i64,
    /// Epoch milliseconds.
    pub end_date: i64,
    /// Coefficient values keyed by attribute name; `Null` when cleared.
    pub coefficients: BTreeMap<String, Value>,
}

impl FeatureAttributes {
    /// Flatten into the attribute map used by the feature service.
    pub fn to_attributes(&self, gpl: &GplConfig) -> Map<String, Value> {
        let mut attributes = Map::new();
        attributes.insert(
            PROJECT_ID_FIELD.to_string(),
            Value::String(self.scope.project_id.clone()),
        );
        attributes.insert(
            SCENARIO_ID_FIELD.to_string(),
            Value::String(self.scope.scenario_id.clone()),
        );
        attributes.insert(
            gpl.field(FieldRole::SourceId).to_string(),
            self.source_id.clone().map(Value::String).unwrap_or(Value::Null),
        );
        attributes.insert(
            gpl.field(FieldRole::Name).to_string(),
            self.name.clone().map(Value::String).unwrap_or(Value::Null),
        );
        attributes.insert(
            gpl.field(FieldRole::ActionId).to_string(),
            Value::String(self.action_id.clone()),
        );
        attributes.insert(
            gpl.field(FieldRole::ActionIds).to_string(),
            Value::String(self.action_ids.clone()),
        );
        attributes.insert(
            gpl.field(FieldRole::StartDate).to_string(),
            Value::from(self.start_date),
        );
        attributes.insert(
            gpl.field(FieldRole::EndDate).to_string(),
            Value::from(self.end_date),
        );
        for (field, value) in &self.coefficients {
            attributes.insert(field.clone(), value.clone());
        }
        attributes
    }
}

/// Esri JSON feature as sent to `applyEdits`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GplFeature {
    pub geometry: EsriGeometry,
    pub attributes: Map<String, Value>,
}

/// Result of an `applyEdits` add batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddFeaturesOutcome {
    /// Object IDs of features that were added.
    pub object_ids: Vec<i64>,
    pub failures: Vec<AddFailure>,
}

/// A feature the service refused to add.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddFailure {
    /// Position in the submitted batch.
    pub index: usize,
    pub code: Option<i64>,
    pub description: String,
}
