// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geodesignhub diagram export → GeoPlanner feature.
//!
//! A diagram that came from GeoPlanner carries the attributes of its source
//! feature in `additional_metadata`. Comparing the diagram's current action
//! against that snapshot decides which attributes survive the round-trip:
//!
//! - action unchanged: name follows the description, coefficients are kept
//! - action changed, description untouched: name is replaced by
//!   [`ACTION_CHANGED_NAME`], coefficients are cleared
//! - action changed, description edited: the new description is the name,
//!   coefficients are cleared

use super::{MappingError, GLOBAL_ID_METADATA_KEY};
use crate::config::{FieldRole, GplConfig};
use crate::models::feature::FeatureAttributes;
use crate::models::{ActionCodeError, ActionIds, EsriDiagramRecord, GplFeature, ScenarioScope};
use crate::time_utils::{date_to_epoch_millis, to_epoch_millis};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Name written when an action was reassigned but the stale name was not edited.
pub const ACTION_CHANGED_NAME: &str = "[climate action changed]";

/// Attribute values recorded by the previous GeoPlanner → Geodesignhub trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviousRound {
    pub name: Option<String>,
    pub action_id: Option<String>,
    pub action_ids: Option<String>,
    pub start_date: Option<Value>,
    pub end_date: Option<Value>,
    pub global_id: Option<String>,
    pub coefficients: Map<String, Value>,
}

impl PreviousRound {
    /// Read the snapshot out of a diagram's `additional_metadata`.
    pub fn from_metadata(metadata: &Map<String, Value>, gpl: &GplConfig) -> Self {
        let text = |key: &str| {
            metadata.get(key).and_then(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };
        let value = |key: &str| metadata.get(key).filter(|v| !v.is_null()).cloned();

        Self {
            name: text(gpl.field(FieldRole::Name)),
            action_id: text(gpl.field(FieldRole::ActionId)),
            action_ids: text(gpl.field(FieldRole::ActionIds)),
            start_date: value(gpl.field(FieldRole::StartDate)),
            end_date: value(gpl.field(FieldRole::EndDate)),
            global_id: text(GLOBAL_ID_METADATA_KEY).or_else(|| text(gpl.field(FieldRole::GlobalId))),
            coefficients: gpl
                .coefficient_fields
                .iter()
                .filter_map(|field| metadata.get(field).map(|v| (field.clone(), v.clone())))
                .collect(),
        }
    }

    /// Primary action of the previous round: ACTION_ID, or else the first
    /// ACTION_IDS code.
    pub fn primary_action(&self) -> Option<&str> {
        self.action_id.as_deref().or_else(|| {
            self.action_ids
                .as_deref()?
                .split('|')
                .map(str::trim)
                .find(|code| !code.is_empty())
        })
    }
}

/// How a diagram's primary action compares with the previous round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// No previous round: the diagram was drawn in Geodesignhub.
    Fresh,
    Unchanged,
    Changed,
    /// A previous round exists but recorded no action at all.
    Unknown,
}

impl ActionStatus {
    fn compare(previous: Option<&PreviousRound>, primary: &str) -> Self {
        match previous.map(PreviousRound::primary_action) {
            None => ActionStatus::Fresh,
            Some(None) => ActionStatus::Unknown,
            Some(Some(prev)) if prev == primary => ActionStatus::Unchanged,
            Some(Some(_)) => ActionStatus::Changed,
        }
    }
}

/// GLOBAL_ID of the source feature: metadata first, then the legacy `notes`
/// attribute (either `{globalid}` or the bare id).
fn source_global_id(record: &EsriDiagramRecord, previous: Option<&PreviousRound>) -> Option<String> {
    if let Some(id) = previous.and_then(|p| p.global_id.clone()) {
        return Some(id);
    }
    match record.attributes.notes.as_ref()? {
        Value::Object(notes) => notes
            .get(GLOBAL_ID_METADATA_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// First date in `candidates` that normalizes to epoch milliseconds.
fn first_date<'a>(candidates: impl IntoIterator<Item = Option<&'a Value>>) -> Option<i64> {
    candidates
        .into_iter()
        .flatten()
        .find_map(|value| match to_epoch_millis(value) {
            Ok(millis) => millis,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable diagram date");
                None
            }
        })
}

/// Map one exported diagram to a feature for the scenario in `scope`.
///
/// Returns `Ok(None)` for diagrams without polygon geometry; those are not
/// migrated and not reported.
pub fn map_diagram(
    record: &EsriDiagramRecord,
    scope: &ScenarioScope,
    gpl: &GplConfig,
) -> Result<Option<GplFeature>, MappingError> {
    let Some(geometry) = record.geometry.as_ref().filter(|g| g.is_polygon()) else {
        return Ok(None);
    };

    let attrs = &record.attributes;
    let previous = attrs
        .additional_metadata
        .as_ref()
        .map(|metadata| PreviousRound::from_metadata(metadata, gpl));

    let parsed = if !attrs.tag_codes.is_empty() {
        ActionIds::from_codes(&attrs.tag_codes)
    } else if let Some(raw) = previous.as_ref().and_then(|p| p.action_ids.as_deref()) {
        ActionIds::parse(raw)
    } else {
        Err(ActionCodeError::Empty)
    };
    let actions = parsed.map_err(|e| match e {
        ActionCodeError::Empty => MappingError::MissingActions,
        other => MappingError::InvalidActions(other),
    })?;

    let primary = actions.primary().as_str();
    let status = ActionStatus::compare(previous.as_ref(), primary);

    let description = attrs
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let previous_name = previous.as_ref().and_then(|p| p.name.as_deref());

    let name = match (status, description) {
        (ActionStatus::Changed, Some(d)) if Some(d) == previous_name => {
            Some(ACTION_CHANGED_NAME.to_string())
        }
        (ActionStatus::Changed, None) => Some(ACTION_CHANGED_NAME.to_string()),
        (_, Some(d)) => Some(d.to_string()),
        (_, None) => previous_name.map(str::to_string),
    };

    let coefficients: BTreeMap<String, Value> = gpl
        .coefficient_fields
        .iter()
        .map(|field| {
            let value = match (status, previous.as_ref()) {
                (ActionStatus::Unchanged, Some(p)) => {
                    p.coefficients.get(field).cloned().unwrap_or(Value::Null)
                }
                _ => Value::Null,
            };
            (field.clone(), value)
        })
        .collect();

    let start_date = first_date([
        attrs.start_date.as_ref(),
        previous.as_ref().and_then(|p| p.start_date.as_ref()),
    ])
    .unwrap_or_else(|| date_to_epoch_millis(gpl.default_start_date));
    let end_date = first_date([
        attrs.end_date.as_ref(),
        previous.as_ref().and_then(|p| p.end_date.as_ref()),
    ])
    .unwrap_or_else(|| date_to_epoch_millis(gpl.default_end_date));

    let feature = FeatureAttributes {
        scope: scope.clone(),
        source_id: source_global_id(record, previous.as_ref()),
        name,
        action_id: primary.to_string(),
        action_ids: actions.joined(),
        start_date,
        end_date,
        coefficients,
    };

    Ok(Some(GplFeature {
        geometry: geometry.clone(),
        attributes: feature.to_attributes(gpl),
    }))
}
