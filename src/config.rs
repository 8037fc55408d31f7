// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Credentials for Geodesignhub and ArcGIS are accepted as already-issued
//! tokens; nothing here talks to an identity provider.

use chrono::NaiveDate;
use std::env;
use std::fmt;

/// Default Geodesignhub API root.
pub const DEFAULT_GDH_API_URL: &str = "https://www.geodesignhub.com/api/v1";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Geodesignhub API root (no trailing slash)
    pub gdh_api_url: String,
    /// Geodesignhub API token (`Authorization: Token ...`)
    pub gdh_api_token: String,
    /// Geodesignhub project ID
    pub gdh_project_id: String,
    /// GeoPlanner project (portal group) ID
    pub gpl_project_id: String,
    /// ArcGIS token passed to feature service calls
    pub arcgis_token: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Per-request timeout for upstream calls
    pub http_timeout_secs: u64,
    /// GeoPlanner schema description
    pub gpl: GplConfig,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            gdh_api_url: env::var("GDH_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_GDH_API_URL.to_string()),
            gdh_api_token: required("GDH_API_TOKEN")?,
            gdh_project_id: required("GDH_PROJECT_ID")?,
            gpl_project_id: required("GPL_PROJECT_ID")?,
            arcgis_token: required("ARCGIS_TOKEN")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_or("PORT", 8080)?,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", 30)?,
            gpl: GplConfig::from_env()?,
        };

        config.gpl.validate()?;
        Ok(config)
    }

    /// Config for tests, pointing Geodesignhub at `gdh_api_url`.
    pub fn test_default(gdh_api_url: &str) -> Self {
        Self {
            gdh_api_url: gdh_api_url.trim_end_matches('/').to_string(),
            gdh_api_token: "test_gdh_token".to_string(),
            gdh_project_id: "test-gdh-project".to_string(),
            gpl_project_id: "test-gpl-project".to_string(),
            arcgis_token: "test_arcgis_token".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            http_timeout_secs: 5,
            gpl: GplConfig::default(),
        }
    }
}

/// Logical attribute roles used by the mappers.
///
/// Physical column names differ between GeoPlanner deployments, so the
/// mapping code only ever refers to a role and resolves it through
/// [`GplConfig::field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    GlobalId,
    SourceId,
    Name,
    Description,
    ActionId,
    ActionIds,
    StartDate,
    EndDate,
}

impl FieldRole {
    pub const ALL: [FieldRole; 8] = [
        FieldRole::GlobalId,
        FieldRole::SourceId,
        FieldRole::Name,
        FieldRole::Description,
        FieldRole::ActionId,
        FieldRole::ActionIds,
        FieldRole::StartDate,
        FieldRole::EndDate,
    ];

    /// Environment variable overriding this role's column name.
    pub fn env_var(self) -> &'static str {
        match self {
            FieldRole::GlobalId => "GPL_FIELD_GLOBAL_ID",
            FieldRole::SourceId => "GPL_FIELD_SOURCE_ID",
            FieldRole::Name => "GPL_FIELD_NAME",
            FieldRole::Description => "GPL_FIELD_DESCRIPTION",
            FieldRole::ActionId => "GPL_FIELD_ACTION_ID",
            FieldRole::ActionIds => "GPL_FIELD_ACTION_IDS",
            FieldRole::StartDate => "GPL_FIELD_START_DATE",
            FieldRole::EndDate => "GPL_FIELD_END_DATE",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldRole::GlobalId => "GLOBAL_ID",
            FieldRole::SourceId => "SOURCE_ID",
            FieldRole::Name => "NAME",
            FieldRole::Description => "DESCRIPTION",
            FieldRole::ActionId => "ACTION_ID",
            FieldRole::ActionIds => "ACTION_IDS",
            FieldRole::StartDate => "START_DATE",
            FieldRole::EndDate => "END_DATE",
        };
        f.write_str(name)
    }
}

/// Physical field names for each [`FieldRole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub global_id: String,
    pub source_id: String,
    pub name: String,
    pub description: String,
    pub action_id: String,
    pub action_ids: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            global_id: "GlobalID".to_string(),
            source_id: "SOURCE_ID".to_string(),
            name: "name".to_string(),
            description: "description".to_string(),
            action_id: "ACTION_ID".to_string(),
            action_ids: "ACTION_IDS".to_string(),
            start_date: "START_DATE".to_string(),
            end_date: "END_DATE".to_string(),
        }
    }
}

impl FieldNames {
    fn slot_mut(&mut self, role: FieldRole) -> &mut String {
        match role {
            FieldRole::GlobalId => &mut self.global_id,
            FieldRole::SourceId => &mut self.source_id,
            FieldRole::Name => &mut self.name,
            FieldRole::Description => &mut self.description,
            FieldRole::ActionId => &mut self.action_id,
            FieldRole::ActionIds => &mut self.action_ids,
            FieldRole::StartDate => &mut self.start_date,
            FieldRole::EndDate => &mut self.end_date,
        }
    }
}

/// GeoPlanner schema description: field names, coefficients, layers, default dates.
///
/// Passed by reference into every mapping function. Two migrations against
/// different schemas simply use two values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GplConfig {
    pub field_names: FieldNames,
    /// Action-specific attributes that are only valid for the action they were computed for.
    pub coefficient_fields: Vec<String>,
    /// Layer holding the climate action features.
    pub actions_layer_id: u32,
    /// Area-of-interest layer.
    pub aoi_layer_id: u32,
    pub default_start_date: NaiveDate,
    pub default_end_date: NaiveDate,
}

impl Default for GplConfig {
    fn default() -> Self {
        Self {
            field_names: FieldNames::default(),
            coefficient_fields: Vec::new(),
            actions_layer_id: 0,
            aoi_layer_id: 1,
            default_start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            default_end_date: NaiveDate::from_ymd_opt(2050, 12, 31).unwrap_or_default(),
        }
    }
}

impl GplConfig {
    /// Load the schema description from `GPL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut gpl = GplConfig::default();

        for role in FieldRole::ALL {
            if let Ok(value) = env::var(role.env_var()) {
                *gpl.field_names.slot_mut(role) = value.trim().to_string();
            }
        }

        if let Ok(raw) = env::var("GPL_COEFFICIENT_FIELDS") {
            gpl.coefficient_fields = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        gpl.actions_layer_id = parse_or("GPL_ACTIONS_LAYER_ID", gpl.actions_layer_id)?;
        gpl.aoi_layer_id = parse_or("GPL_AOI_LAYER_ID", gpl.aoi_layer_id)?;
        gpl.default_start_date = parse_date_or("GPL_DEFAULT_START_DATE", gpl.default_start_date)?;
        gpl.default_end_date = parse_date_or("GPL_DEFAULT_END_DATE", gpl.default_end_date)?;

        Ok(gpl)
    }

    /// Resolve a logical role to its physical attribute name.
    pub fn field(&self, role: FieldRole) -> &str {
        let names = &self.field_names;
        match role {
            FieldRole::GlobalId => &names.global_id,
            FieldRole::SourceId => &names.source_id,
            FieldRole::Name => &names.name,
            FieldRole::Description => &names.description,
            FieldRole::ActionId => &names.action_id,
            FieldRole::ActionIds => &names.action_ids,
            FieldRole::StartDate => &names.start_date,
            FieldRole::EndDate => &names.end_date,
        }
    }

    /// Check that every role resolves and the coefficient list is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for role in FieldRole::ALL {
            if self.field(role).trim().is_empty() {
                return Err(ConfigError::EmptyField(role));
            }
        }

        for coefficient in &self.coefficient_fields {
            if coefficient.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    var: "GPL_COEFFICIENT_FIELDS",
                    reason: "empty coefficient name".to_string(),
                });
            }
            if let Some(role) = FieldRole::ALL
                .into_iter()
                .find(|role| self.field(*role) == coefficient)
            {
                return Err(ConfigError::Invalid {
                    var: "GPL_COEFFICIENT_FIELDS",
                    reason: format!("'{}' is already the {} field", coefficient, role),
                });
            }
        }

        if self.default_end_date < self.default_start_date {
            return Err(ConfigError::Invalid {
                var: "GPL_DEFAULT_END_DATE",
                reason: "default end date precedes default start date".to_string(),
            });
        }

        Ok(())
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parse_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_date_or(var: &'static str, default: NaiveDate) -> Result<NaiveDate, ConfigError> {
    match env::var(var) {
        Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
            ConfigError::Invalid {
                var,
                reason: format!("expected YYYY-MM-DD: {}", e),
            }
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("GeoPlanner field name for role {0} is empty")]
    EmptyField(FieldRole),
}
