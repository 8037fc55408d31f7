// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoPlanner feature → Geodesignhub diagram submission.

use super::{MappingError, GLOBAL_ID_METADATA_KEY};
use crate::config::{FieldRole, GplConfig};
use crate::models::{ActionCodeError, ActionIds, DiagramSubmission};
use crate::services::winding::{rewind_geometry, GDH_EXTERIOR};
use geojson::Feature;
use serde_json::{Map, Value};

/// Title used when a feature has neither a name nor a description.
pub const DEFAULT_DIAGRAM_NAME: &str = "GPL Migration";

/// Raw ACTION_IDS value of a feature, if it has a non-blank one.
fn raw_action_ids(feature: &Feature, gpl: &GplConfig) -> Option<String> {
    match feature.property(gpl.field(FieldRole::ActionIds))? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// True if the feature carries at least one action code.
pub fn has_actions(feature: &Feature, gpl: &GplConfig) -> bool {
    raw_action_ids(feature, gpl)
        .is_some_and(|raw| raw.split('|').any(|code| !code.trim().is_empty()))
}

/// Parse the feature's ACTION_IDS attribute.
pub fn feature_actions(feature: &Feature, gpl: &GplConfig) -> Result<ActionIds, MappingError> {
    let raw = raw_action_ids(feature, gpl).ok_or(MappingError::MissingActions)?;
    ActionIds::parse(&raw).map_err(|e| match e {
        ActionCodeError::Empty => MappingError::MissingActions,
        other => MappingError::InvalidActions(other),
    })
}

fn non_empty_str<'a>(feature: &'a Feature, field: &str) -> Option<&'a str> {
    feature
        .property(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn present(feature: &Feature, field: &str) -> Option<Value> {
    feature.property(field).filter(|v| !v.is_null()).cloned()
}

/// Map one polygon feature to a diagram submission.
///
/// - `system` comes from the primary (first) action code
/// - `tags` are all action codes in source order
/// - title is NAME, then DESCRIPTION, then [`DEFAULT_DIAGRAM_NAME`]
/// - dates pass through untouched; absent stays absent
/// - `additional_metadata` records GLOBAL_ID under `globalid` plus a snapshot
///   of the attributes the inbound mapper compares on the way back
pub fn map_feature(feature: &Feature, gpl: &GplConfig) -> Result<DiagramSubmission, MappingError> {
    let mut geometry = feature
        .geometry
        .clone()
        .ok_or(MappingError::MissingGeometry)?;
    match &geometry.value {
        geojson::Value::Polygon(_) | geojson::Value::MultiPolygon(_) => {}
        other => return Err(MappingError::UnsupportedGeometry(geometry_type(other).to_string())),
    }

    let actions = feature_actions(feature, gpl)?;

    let description = non_empty_str(feature, gpl.field(FieldRole::Name))
        .or_else(|| non_empty_str(feature, gpl.field(FieldRole::Description)))
        .unwrap_or(DEFAULT_DIAGRAM_NAME)
        .to_string();

    let start_date = present(feature, gpl.field(FieldRole::StartDate));
    let end_date = present(feature, gpl.field(FieldRole::EndDate));

    let mut metadata = Map::new();
    metadata.insert(
        GLOBAL_ID_METADATA_KEY.to_string(),
        present(feature, gpl.field(FieldRole::GlobalId)).unwrap_or(Value::Null),
    );
    if let Some(name) = present(feature, gpl.field(FieldRole::Name)) {
        metadata.insert(gpl.field(FieldRole::Name).to_string(), name);
    }
    metadata.insert(
        gpl.field(FieldRole::ActionId).to_string(),
        Value::String(actions.primary().to_string()),
    );
    metadata.insert(
        gpl.field(FieldRole::ActionIds).to_string(),
        Value::String(actions.joined()),
    );
    for (role, value) in [
        (FieldRole::StartDate, &start_date),
        (FieldRole::EndDate, &end_date),
    ] {
        if let Some(value) = value {
            metadata.insert(gpl.field(role).to_string(), value.clone());
        }
    }
    for coefficient in &gpl.coefficient_fields {
        if let Some(value) = present(feature, coefficient) {
            metadata.insert(coefficient.clone(), value);
        }
    }

    rewind_geometry(&mut geometry, GDH_EXTERIOR);

    Ok(DiagramSubmission {
        description,
        system: actions.system(),
        tags: actions.to_tags(),
        start_date,
        end_date,
        additional_metadata: metadata,
        geometry,
        properties: feature.properties.clone().unwrap_or_default(),
    })
}
