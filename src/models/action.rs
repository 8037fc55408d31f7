// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Climate action codes and the systems they belong to.
//!
//! An action code is a dotted string `"<system>.<policy>.<action>"`, e.g.
//! `"3.1.12"` (forest restoration). GeoPlanner stores several codes in one
//! attribute separated by `|`; the first one is the primary action.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between action codes in a GeoPlanner ACTION_IDS attribute.
pub const ACTION_SEPARATOR: char = '|';

/// GeoPlanner system code (1-8 in the IGC schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemCode(pub u32);

impl fmt::Display for SystemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single validated climate action code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionCode {
    code: String,
    system: SystemCode,
}

impl ActionCode {
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// System encoded in the leading segment.
    pub fn system(&self) -> SystemCode {
        self.system
    }
}

impl FromStr for ActionCode {
    type Err = ActionCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        let invalid = || ActionCodeError::Invalid(code.to_string());

        let mut segments = code.split('.');
        let system = segments
            .next()
            .filter(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|seg| seg.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(invalid)?;

        // Remaining segments (policy, action) must be non-empty when present.
        if segments.any(str::is_empty) {
            return Err(invalid());
        }

        Ok(Self {
            code: code.to_string(),
            system: SystemCode(system),
        })
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Ordered, non-empty list of action codes that share one system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionIds {
    codes: Vec<ActionCode>,
}

impl ActionIds {
    /// Build from individual code strings, keeping their order.
    pub fn from_codes<I, S>(codes: I) -> Result<Self, ActionCodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .map(|c| c.parse::<ActionCode>())
            .collect::<Result<Vec<_>, _>>()?;

        let first = codes.first().ok_or(ActionCodeError::Empty)?;
        let system = first.system();
        if let Some(other) = codes.iter().find(|c| c.system() != system) {
            return Err(ActionCodeError::MixedSystems {
                first: first.to_string(),
                other: other.to_string(),
            });
        }

        Ok(Self { codes })
    }

    /// Parse a pipe-delimited ACTION_IDS attribute value.
    pub fn parse(raw: &str) -> Result<Self, ActionCodeError> {
        Self::from_codes(raw.split(ACTION_SEPARATOR))
    }

    /// The first (displayed) action.
    pub fn primary(&self) -> &ActionCode {
        // from_codes never builds an empty list
        &self.codes[0]
    }

    pub fn system(&self) -> SystemCode {
        self.primary().system()
    }

    /// Codes as plain strings, in order (Geodesignhub `tag_codes`).
    pub fn to_tags(&self) -> Vec<String> {
        self.codes.iter().map(|c| c.to_string()).collect()
    }

    /// Pipe-delimited form stored in the ACTION_IDS attribute.
    pub fn joined(&self) -> String {
        self.to_tags().join(&ACTION_SEPARATOR.to_string())
    }
}

/// Problems with action code values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionCodeError {
    #[error("No action codes")]
    Empty,

    #[error("Malformed action code '{0}' (expected <system>.<policy>.<action>)")]
    Invalid(String),

    #[error("Action codes span several systems ('{first}' and '{other}')")]
    MixedSystems { first: String, other: String },
}
