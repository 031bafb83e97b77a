// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The skill catalog: a small, read-only table of named prompt templates
//! ("skills"), queried by the web portal's `/api/skills` route. Supplements
//! the distilled spec, which names the route but not its backing store —
//! see DESIGN.md. Unlike the Fitness Log, this is a plain JSON file: it is
//! never mutated by this build (no `record`/`deactivate` operations), so a
//! WAL buys nothing here.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillCatalogError {
    #[error("reading skill catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing skill catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub usage_count: u64,
    /// The port the skill's own runner is currently listening on, if it is
    /// actively serving. Optional per the original source's unfinished
    /// auto-detection — the portal only renders an iframe when present.
    #[serde(default)]
    pub serving_port: Option<u16>,
}

/// A read-only, in-memory view of the skill catalog.
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    skills: Vec<Skill>,
}

impl SkillCatalog {
    /// Load the catalog from a JSON array file. A missing file yields an
    /// empty catalog rather than an error — the catalog is an optional
    /// enrichment, not a required store.
    pub fn load(path: &Path) -> Result<Self, SkillCatalogError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let skills: Vec<Skill> = serde_json::from_str(&contents)?;
                Ok(Self { skills })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// All skills, ordered by usage count descending.
    pub fn all(&self) -> Vec<&Skill> {
        let mut sorted: Vec<&Skill> = self.skills.iter().collect();
        sorted.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        sorted
    }

    /// Look up a skill by name.
    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[cfg(test)]
#[path = "skill_catalog_tests.rs"]
mod tests;
