// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attribute mapping between GeoPlanner features and Geodesignhub diagrams.
//!
//! - [`outbound`]: GeoPlanner feature → Geodesignhub diagram submission
//! - [`inbound`]: Geodesignhub diagram export → GeoPlanner feature
//!
//! Both directions keep one feature ↔ one diagram; every action code of a
//! feature travels as a tag of the same diagram.

pub mod inbound;
pub mod outbound;

use crate::models::ActionCodeError;

/// Metadata key holding the GLOBAL_ID of the originating GeoPlanner feature.
pub const GLOBAL_ID_METADATA_KEY: &str = "globalid";

/// Why a single record could not be mapped. Never fatal to a batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("No climate action codes")]
    MissingActions,

    #[error(transparent)]
    InvalidActions(#[from] ActionCodeError),

    #[error("No geometry")]
    MissingGeometry,

    #[error("Unsupported geometry type {0} (only polygons are migrated)")]
    UnsupportedGeometry(String),
}
