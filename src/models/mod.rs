// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for both sides of the bridge.

pub mod action;
pub mod diagram;
pub mod feature;
pub mod report;

pub use action::{ActionCode, ActionCodeError, ActionIds, SystemCode};
pub use diagram::{
    DesignSynthesis, DesignTeam, DiagramProperties, DiagramSubmission,
    EsriDiagramRecord, EsriGeometry, GdhProject, GdhSystem,
};
pub use feature::{AddFeaturesOutcome, FeatureAttributes, GplFeature, ScenarioScope};
pub use report::{ExportReport, ImportPreview, ImportReport, SubmissionOutcome, SubmissionReport};
