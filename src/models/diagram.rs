// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geodesignhub-side records: systems, teams, designs and diagrams.

use crate::models::action::SystemCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Geodesignhub project info (only the fields the bridge reads).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GdhProject {
    #[serde(default)]
    pub external_connection: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A Geodesignhub system (sector) within a project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GdhSystem {
    pub id: u64,
    pub sysname: String,
    #[serde(default)]
    pub syscolor: String,
}

/// A design team.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DesignTeam {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub title: String,
}

/// Designs produced by a team.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeamDesigns {
    #[serde(default)]
    pub synthesis: Vec<DesignSynthesis>,
}

/// One negotiated design (synthesis).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DesignSynthesis {
    pub id: String,
    pub description: String,
}

/// A diagram ready to be submitted to Geodesignhub.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSubmission {
    /// Diagram title/description.
    pub description: String,
    pub system: SystemCode,
    /// Action codes, primary first.
    pub tags: Vec<String>,
    pub start_date: Option<Value>,
    pub end_date: Option<Value>,
    /// Carry-over snapshot read back on the next round-trip.
    pub additional_metadata: Map<String, Value>,
    /// Geometry with normalized winding.
    pub geometry: geojson::Geometry,
    /// Source feature properties sent along with the geometry.
    pub properties: Map<String, Value>,
}

impl DiagramSubmission {
    /// Body for the "add diagram under system" call.
    pub fn create_payload(&self) -> CreateDiagramPayload {
        let mut properties = self.properties.clone();
        properties.insert("system".to_string(), Value::from(self.system.0));
        properties.insert(
            "tags".to_string(),
            Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
        );

        let feature = geojson::Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        };

        CreateDiagramPayload {
            featuretype: feature_type(&self.geometry.value).to_string(),
            description: self.description.clone(),
            geometry: geojson::FeatureCollection {
                bbox: None,
                features: vec![feature],
                foreign_members: None,
            },
        }
    }

    /// Body for the "update diagram properties" call.
    pub fn properties_payload(&self) -> DiagramProperties {
        DiagramProperties {
            additional_metadata: self.additional_metadata.clone(),
            tag_codes: self.tags.clone(),
            title: self.description.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

/// Geodesignhub feature type name for a geometry: the lowercased GeoJSON
/// type, except that a single line string is a `polyline`.
pub fn feature_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "point",
        geojson::Value::MultiPoint(_) => "multipoint",
        geojson::Value::LineString(_) => "polyline",
        geojson::Value::MultiLineString(_) => "multilinestring",
        geojson::Value::Polygon(_) => "polygon",
        geojson::Value::MultiPolygon(_) => "multipolygon",
        geojson::Value::GeometryCollection(_) => "geometrycollection",
    }
}

/// Body of `POST .../systems/{id}/add/{project|policy}/`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDiagramPayload {
    pub featuretype: String,
    pub description: String,
    pub geometry: geojson::FeatureCollection,
}

/// Body of `POST .../diagrams/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramProperties {
    pub additional_metadata: Map<String, Value>,
    pub tag_codes: Vec<String>,
    pub title: String,
    pub start_date: Option<Value>,
    pub end_date: Option<Value>,
}

/// Response of "design as Esri JSON": either a bare list or `{features: [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EsriDesignExport {
    Features(Vec<EsriDiagramRecord>),
    Wrapped { features: Vec<EsriDiagramRecord> },
}

impl EsriDesignExport {
    pub fn into_records(self) -> Vec<EsriDiagramRecord> {
        match self {
            EsriDesignExport::Features(records) => records,
            EsriDesignExport::Wrapped { features } => features,
        }
    }
}

/// One diagram of a negotiated design, as an Esri JSON feature.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EsriDiagramRecord {
    #[serde(default)]
    pub geometry: Option<EsriGeometry>,
    pub attributes: EsriDiagramAttributes,
}

/// Esri JSON geometry. Only `rings` (polygons) is interpreted; everything
/// else (`spatialReference`, `hasZ`, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EsriGeometry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rings: Option<Vec<Vec<Vec<f64>>>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl EsriGeometry {
    pub fn is_polygon(&self) -> bool {
        self.rings.as_ref().is_some_and(|rings| !rings.is_empty())
    }
}

/// Attributes of an exported diagram.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EsriDiagramAttributes {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tag_codes")]
    pub tag_codes: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_metadata")]
    pub additional_metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub notes: Option<Value>,
    #[serde(default)]
    pub start_date: Option<Value>,
    #[serde(default)]
    pub end_date: Option<Value>,
}

/// `tag_codes` arrives as a list, a `|`/`,` delimited string, or null.
fn deserialize_tag_codes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let codes = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => s
            .split(['|', ','])
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|c| !c.is_empty())
            .collect(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "unexpected tag_codes value: {}",
                other
            )))
        }
    };
    Ok(codes)
}

/// `additional_metadata` arrives as an object, a JSON-encoded object, or empty.
fn deserialize_metadata<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) if !map.is_empty() => Some(map),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) if !map.is_empty() => Some(map),
            _ => None,
        },
        _ => None,
    })
}
