// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod feature_service;
pub mod geodesignhub;
pub mod mapping;
pub mod messages;
pub mod migration;
pub mod submission;
pub mod winding;

pub use feature_service::{FeatureServiceClient, FeatureSource};
pub use geodesignhub::{DiagramSink, GeodesignhubClient, SystemResolver};
pub use messages::MessageLog;
pub use migration::{ExportDesign, ImportScenario, MigrationService};
