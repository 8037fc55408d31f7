// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-item and per-migration reports returned to the operator.

use crate::models::feature::AddFeaturesOutcome;
use crate::services::messages::LogEntry;
use serde::Serialize;

/// Which of the two Geodesignhub calls failed for a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    Create,
    Update,
}

/// What happened to one diagram of a submission batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Submitted {
        index: usize,
        description: String,
        diagram_id: u64,
    },
    Skipped {
        index: usize,
        description: String,
        reason: String,
    },
    Failed {
        index: usize,
        description: String,
        stage: SubmissionStage,
        /// Set when creation succeeded and the property update failed.
        diagram_id: Option<u64>,
        reason: String,
    },
}

/// Outcomes of a whole submission batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmissionReport {
    pub outcomes: Vec<SubmissionOutcome>,
}

impl SubmissionReport {
    pub fn submitted(&self) -> usize {
        self.count(|o| matches!(o, SubmissionOutcome::Submitted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SubmissionOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SubmissionOutcome::Failed { .. }))
    }

    /// IDs of diagrams that went through both calls.
    pub fn diagram_ids(&self) -> Vec<u64> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SubmissionOutcome::Submitted { diagram_id, .. } => Some(*diagram_id),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&SubmissionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Result of counting a scenario's migratable features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportPreview {
    pub scenario_id: String,
    pub feature_count: u64,
}

/// GeoPlanner scenario → Geodesignhub diagrams.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Matching features according to the count query.
    pub feature_count: u64,
    /// Features dropped before mapping (no action, non-polygon, bad codes).
    pub features_skipped: usize,
    pub submission: SubmissionReport,
    /// Operator messages written by this import.
    pub messages: Vec<LogEntry>,
}

/// Geodesignhub design → GeoPlanner scenario features.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub scenario_id: String,
    /// Diagrams in the exported design.
    pub diagram_count: usize,
    /// Diagrams excluded by the mapper.
    pub diagrams_excluded: usize,
    pub added: AddFeaturesOutcome,
    /// Operator messages written by this export.
    pub messages: Vec<LogEntry>,
}
