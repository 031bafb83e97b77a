// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the supervisor kernel needs to perform.
//! The kernel itself stays pure — it decides *what* to do and hands the
//! decision to an adapter as one of these values, the same separation the
//! teacher draws between its state machine and its effect executors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::event::Event;
use crate::id::{GenerationId, RevisionId, TaskId};

/// Effects the kernel asks an adapter to execute on its behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Emit an event into the structured log / activity feed.
    Emit { event: Event },

    /// Spawn the worker process for a generation.
    SpawnWorker {
        generation: GenerationId,
        env: HashMap<String, String>,
    },

    /// Stop the worker process, gracefully and then forcefully.
    StopWorker { generation: GenerationId },

    /// Append a fitness record for a completed generation.
    RecordFitness {
        generation: GenerationId,
        score: f64,
        survived: bool,
    },

    /// Snapshot the worker source tree into the revision store.
    SnapshotRevision {
        generation: GenerationId,
        message: String,
    },

    /// Roll the worker source tree back to a prior revision.
    RollbackRevision {
        generation: GenerationId,
        revision: RevisionId,
    },

    /// Ask the evolution orchestrator to produce a mutation for the next
    /// generation.
    RequestEvolution {
        generation: GenerationId,
        intent: String,
    },

    /// Send a message to the operator over the chat channel.
    NotifyOperator { chat_id: String, message: String },

    /// Place an operator-submitted task on the FIFO queue.
    EnqueueTask { task: TaskId },
}

impl Effect {
    /// Effect name for log spans (e.g. "spawn_worker", "record_fitness").
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Emit { .. } => "emit",
            Effect::SpawnWorker { .. } => "spawn_worker",
            Effect::StopWorker { .. } => "stop_worker",
            Effect::RecordFitness { .. } => "record_fitness",
            Effect::SnapshotRevision { .. } => "snapshot_revision",
            Effect::RollbackRevision { .. } => "rollback_revision",
            Effect::RequestEvolution { .. } => "request_evolution",
            Effect::NotifyOperator { .. } => "notify_operator",
            Effect::EnqueueTask { .. } => "enqueue_task",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit { event } => vec![("event", event.log_summary())],
            Effect::SpawnWorker { generation, env } => vec![
                ("generation", generation.to_string()),
                ("env_keys", env.len().to_string()),
            ],
            Effect::StopWorker { generation } => vec![("generation", generation.to_string())],
            Effect::RecordFitness {
                generation,
                score,
                survived,
            } => vec![
                ("generation", generation.to_string()),
                ("score", format!("{score:.3}")),
                ("survived", survived.to_string()),
            ],
            Effect::SnapshotRevision { generation, message } => vec![
                ("generation", generation.to_string()),
                ("message", message.clone()),
            ],
            Effect::RollbackRevision { generation, revision } => vec![
                ("generation", generation.to_string()),
                ("revision", revision.short(12).to_string()),
            ],
            Effect::RequestEvolution { generation, intent } => vec![
                ("generation", generation.to_string()),
                ("intent", intent.clone()),
            ],
            Effect::NotifyOperator { chat_id, .. } => vec![("chat_id", chat_id.clone())],
            Effect::EnqueueTask { task } => vec![("task", task.to_string())],
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
