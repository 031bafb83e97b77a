// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generation lifecycle events, tagged for structured logging and for the
//! web portal's recent-activity view. Unlike the teacher's event-sourced
//! core, these are not replayed to reconstruct state — the Fitness Log's
//! write-ahead log is Protea's only durable event stream (see
//! `protea-storage::wal`). This enum exists purely as a structured,
//! serializable record of "what the kernel just did" for logging and the
//! portal.

use serde::{Deserialize, Serialize};

use crate::id::{GenerationId, RevisionId, TaskId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "generation:started")]
    GenerationStarted { generation: GenerationId },
    #[serde(rename = "worker:spawned")]
    WorkerSpawned { generation: GenerationId, pid: u32 },
    #[serde(rename = "heartbeat:lost")]
    HeartbeatLost {
        generation: GenerationId,
        elapsed_sec: f64,
    },
    #[serde(rename = "generation:recorded")]
    GenerationRecorded {
        generation: GenerationId,
        score: f64,
        survived: bool,
    },
    #[serde(rename = "revision:snapshotted")]
    RevisionSnapshotted {
        generation: GenerationId,
        revision: RevisionId,
        phase: String,
    },
    #[serde(rename = "revision:rolled_back")]
    RevisionRolledBack {
        generation: GenerationId,
        revision: RevisionId,
    },
    #[serde(rename = "evolution:started")]
    EvolutionStarted {
        generation: GenerationId,
        intent: String,
    },
    #[serde(rename = "evolution:succeeded")]
    EvolutionSucceeded {
        generation: GenerationId,
        reason: String,
    },
    #[serde(rename = "evolution:failed")]
    EvolutionFailed {
        generation: GenerationId,
        reason: String,
    },
    #[serde(rename = "worker:restarting")]
    WorkerRestarting {
        generation: GenerationId,
        advanced: bool,
    },
    #[serde(rename = "operator:command")]
    OperatorCommand { chat_id: String, command: String },
    #[serde(rename = "task:enqueued")]
    TaskEnqueued { task: TaskId },
    #[serde(rename = "task:completed")]
    TaskCompleted { task: TaskId },
    #[serde(rename = "supervisor:shutdown")]
    Shutdown,

    /// Forward-compatibility catch-all for event shapes this build doesn't
    /// know about yet.
    #[serde(other, skip_serializing)]
    Custom,
}

impl Event {
    /// A short, stable name for the event — used as the `tracing` span/event
    /// name and as the portal's activity-feed label.
    pub fn name(&self) -> &'static str {
        match self {
            Event::GenerationStarted { .. } => "generation:started",
            Event::WorkerSpawned { .. } => "worker:spawned",
            Event::HeartbeatLost { .. } => "heartbeat:lost",
            Event::GenerationRecorded { .. } => "generation:recorded",
            Event::RevisionSnapshotted { .. } => "revision:snapshotted",
            Event::RevisionRolledBack { .. } => "revision:rolled_back",
            Event::EvolutionStarted { .. } => "evolution:started",
            Event::EvolutionSucceeded { .. } => "evolution:succeeded",
            Event::EvolutionFailed { .. } => "evolution:failed",
            Event::WorkerRestarting { .. } => "worker:restarting",
            Event::OperatorCommand { .. } => "operator:command",
            Event::TaskEnqueued { .. } => "task:enqueued",
            Event::TaskCompleted { .. } => "task:completed",
            Event::Shutdown => "supervisor:shutdown",
            Event::Custom => "custom",
        }
    }

    /// A one-line human-readable summary for the log.
    pub fn log_summary(&self) -> String {
        match self {
            Event::GenerationStarted { generation } => format!("generation {generation} started"),
            Event::WorkerSpawned { generation, pid } => {
                format!("worker for generation {generation} spawned (pid={pid})")
            }
            Event::HeartbeatLost {
                generation,
                elapsed_sec,
            } => format!("heartbeat lost for generation {generation} after {elapsed_sec:.1}s"),
            Event::GenerationRecorded {
                generation,
                score,
                survived,
            } => format!("generation {generation} recorded score={score:.2} survived={survived}"),
            Event::RevisionSnapshotted {
                generation,
                revision,
                phase,
            } => format!(
                "generation {generation} snapshotted {} ({phase})",
                revision.short(12)
            ),
            Event::RevisionRolledBack {
                generation,
                revision,
            } => format!(
                "generation {generation} rolled back to {}",
                revision.short(12)
            ),
            Event::EvolutionStarted { generation, intent } => {
                format!("generation {generation} evolving (intent={intent})")
            }
            Event::EvolutionSucceeded { generation, reason } => {
                format!("generation {generation} evolution succeeded: {reason}")
            }
            Event::EvolutionFailed { generation, reason } => {
                format!("generation {generation} evolution failed: {reason}")
            }
            Event::WorkerRestarting {
                generation,
                advanced,
            } => format!("restarting worker (generation={generation}, advanced={advanced})"),
            Event::OperatorCommand { chat_id, command } => {
                format!("operator {chat_id} issued {command}")
            }
            Event::TaskEnqueued { task } => format!("task {task} enqueued"),
            Event::TaskCompleted { task } => format!("task {task} completed"),
            Event::Shutdown => "supervisor shutting down".to_string(),
            Event::Custom => "custom event".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
