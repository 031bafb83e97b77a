// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The value read by chat/task/portal consumers under the Shared Supervisor
//! State's lock: a consistent snapshot of kernel progress and control flags.

use serde::{Deserialize, Serialize};

use crate::id::GenerationId;

/// A consistent point-in-time read of supervisor progress and flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupervisorSnapshot {
    pub generation_id: GenerationId,
    pub start_wall_time: f64,
    pub alive: bool,
    pub mutation_rate: f64,
    pub max_runtime_sec: u32,
    pub last_score: f64,
    pub last_survived: bool,
    pub paused: bool,
    pub p0_active: bool,
}

impl SupervisorSnapshot {
    pub fn starting(generation_id: GenerationId, start_wall_time: f64) -> Self {
        Self {
            generation_id,
            start_wall_time,
            alive: false,
            mutation_rate: 0.0,
            max_runtime_sec: 0,
            last_score: 0.0,
            last_survived: false,
            paused: false,
            p0_active: false,
        }
    }

    /// Render as a Markdown status reply for the chat operator's `/status`.
    pub fn to_markdown(&self, uptime_sec: f64) -> String {
        let status = if self.paused {
            "PAUSED"
        } else if self.alive {
            "ALIVE"
        } else {
            "DEAD"
        };
        format!(
            "*Protea Status*\nGeneration: {}\nStatus: {}\nUptime: {:.0}s\nMutation rate: {:.2}\nMax runtime: {:.0}s",
            self.generation_id, status, uptime_sec, self.mutation_rate, self.max_runtime_sec
        )
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
