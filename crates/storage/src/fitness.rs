// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Fitness Log: an append-only record of per-generation outcomes.
//!
//! Durability is a JSONL write-ahead log (see [`crate::wal`]); queries run
//! against an in-memory index rebuilt by replaying the WAL at startup, the
//! same snapshot-free replay-on-open shape the teacher's daemon uses before
//! its first checkpoint exists.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use protea_core::{GenerationId, RevisionId};

use crate::wal::{Wal, WalError};

/// One row of the Fitness Log: `{id, generation_id, revision_id, score,
/// runtime_sec, survived, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessEntry {
    pub id: u64,
    pub generation_id: GenerationId,
    pub revision_id: RevisionId,
    pub score: f64,
    pub runtime_sec: f64,
    pub survived: bool,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate stats for a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub avg_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub count: u32,
}

/// Append-only fitness store: durable WAL plus an in-memory materialized
/// index for `top`/`history`/`generation_stats`/`is_plateaued` queries.
pub struct FitnessLog {
    wal: Wal,
    entries: Vec<FitnessEntry>,
}

impl FitnessLog {
    /// Open (or create) the fitness WAL at `path` and replay it into the
    /// in-memory index.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let mut wal = Wal::open(path)?;
        let entries = wal.replay()?;
        Ok(Self { wal, entries })
    }

    /// Append a new fitness entry. Returns the assigned `id`.
    pub fn record(
        &mut self,
        generation_id: GenerationId,
        revision_id: RevisionId,
        score: f64,
        runtime_sec: f64,
        survived: bool,
    ) -> Result<u64, WalError> {
        let id = self.entries.last().map_or(0, |e| e.id) + 1;
        let entry = FitnessEntry {
            id,
            generation_id,
            revision_id,
            score,
            runtime_sec,
            survived,
            timestamp: Utc::now(),
        };
        self.wal.append(&entry)?;
        self.wal.flush()?;
        self.entries.push(entry);
        Ok(id)
    }

    /// Top `n` entries by score descending.
    pub fn top(&self, n: usize) -> Vec<&FitnessEntry> {
        let mut sorted: Vec<&FitnessEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        sorted.truncate(n);
        sorted
    }

    /// Most recent `limit` entries by id descending.
    pub fn history(&self, limit: usize) -> Vec<&FitnessEntry> {
        let mut sorted: Vec<&FitnessEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.id.cmp(&a.id));
        sorted.truncate(limit);
        sorted
    }

    /// Aggregate stats for a single generation, or `None` if it has no
    /// entries.
    pub fn generation_stats(&self, generation: GenerationId) -> Option<GenerationStats> {
        let scores: Vec<f64> = self
            .entries
            .iter()
            .filter(|e| e.generation_id == generation)
            .map(|e| e.score)
            .collect();
        if scores.is_empty() {
            return None;
        }
        let count = scores.len() as u32;
        let sum: f64 = scores.iter().sum();
        let max_score = scores.iter().cloned().fold(f64::MIN, f64::max);
        let min_score = scores.iter().cloned().fold(f64::MAX, f64::min);
        Some(GenerationStats {
            avg_score: sum / count as f64,
            max_score,
            min_score,
            count,
        })
    }

    /// True when the score range over the last `window` *survived* entries
    /// is below a small epsilon — resolves the distilled spec's unspecified
    /// `is_plateaued` input (see DESIGN.md).
    pub fn is_plateaued(&self, window: usize) -> bool {
        const EPSILON: f64 = 0.02;
        let recent: Vec<f64> = self
            .entries
            .iter()
            .rev()
            .filter(|e| e.survived)
            .take(window)
            .map(|e| e.score)
            .collect();
        if recent.len() < window {
            return false;
        }
        let max = recent.iter().cloned().fold(f64::MIN, f64::max);
        let min = recent.iter().cloned().fold(f64::MAX, f64::min);
        (max - min) < EPSILON
    }
}

#[cfg(test)]
#[path = "fitness_tests.rs"]
mod tests;
