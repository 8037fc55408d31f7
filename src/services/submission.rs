// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Diagram submission sequencer.
//!
//! Diagrams go to Geodesignhub one at a time, each as a create call followed
//! by a property update on the returned diagram ID. A failure on either call
//! is recorded for that diagram and the batch moves on.

use crate::models::{DiagramSubmission, SubmissionOutcome, SubmissionReport};
use crate::models::report::SubmissionStage;
use crate::services::geodesignhub::{DiagramSink, SystemResolver};
use crate::services::messages::MessageLog;

/// Submit `diagrams` in order and report what happened to each.
pub async fn submit_diagrams<S: DiagramSink + Sync>(
    sink: &S,
    systems: &SystemResolver,
    diagrams: Vec<DiagramSubmission>,
    messages: &MessageLog,
) -> SubmissionReport {
    let total = diagrams.len();
    let mut report = SubmissionReport {
        outcomes: Vec::with_capacity(total),
    };

    for (index, diagram) in diagrams.into_iter().enumerate() {
        let outcome = submit_one(sink, systems, index, diagram, messages).await;
        report.outcomes.push(outcome);
    }

    let failed = report.failed();
    if failed > 0 {
        messages.error(format!(
            "{} of {} diagrams failed to migrate to Geodesignhub",
            failed, total
        ));
    }
    messages.info(format!(
        "Diagram submission finished: {} submitted, {} skipped, {} failed",
        report.submitted(),
        report.skipped(),
        failed
    ));

    report
}

async fn submit_one<S: DiagramSink + Sync>(
    sink: &S,
    systems: &SystemResolver,
    index: usize,
    diagram: DiagramSubmission,
    messages: &MessageLog,
) -> SubmissionOutcome {
    let description = diagram.description.clone();

    let Some(system_id) = systems.resolve(diagram.system) else {
        let reason = format!("No Geodesignhub system for system code {}", diagram.system);
        messages.warn(format!("Skipping diagram '{}': {}", description, reason));
        return SubmissionOutcome::Skipped {
            index,
            description,
            reason,
        };
    };

    let diagram_id = match sink
        .create_diagram(system_id, &diagram.create_payload())
        .await
    {
        Ok(id) => id,
        Err(e) => {
            messages.error(format!("Creating diagram '{}' failed: {}", description, e));
            return SubmissionOutcome::Failed {
                index,
                description,
                stage: SubmissionStage::Create,
                diagram_id: None,
                reason: e.to_string(),
            };
        }
    };

    if let Err(e) = sink
        .update_diagram_properties(diagram_id, &diagram.properties_payload())
        .await
    {
        messages.error(format!(
            "Updating diagram {} ('{}') failed: {}",
            diagram_id, description, e
        ));
        return SubmissionOutcome::Failed {
            index,
            description,
            stage: SubmissionStage::Update,
            diagram_id: Some(diagram_id),
            reason: e.to_string(),
        };
    }

    tracing::debug!(index, diagram_id, system_id, "Diagram submitted");
    messages.info(format!("Created diagram {} '{}'", diagram_id, description));
    SubmissionOutcome::Submitted {
        index,
        description,
        diagram_id,
    }
}
