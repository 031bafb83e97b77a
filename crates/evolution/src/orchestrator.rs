// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Evolution Orchestrator (C8): assembles a prompt from fitness
//! history and generation parameters, submits it to the LLM, validates the
//! returned source, and overwrites the worker entrypoint on success.
//!
//! Depends only on the LLM adapter and a narrow fitness-history reader —
//! never on the kernel — per the redesign note about breaking cyclic
//! supervisor/evolver imports. The kernel holds this behind a trait object
//! rather than a concrete type so it can substitute a fake in tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use protea_adapters::ClaudeClient;
use protea_core::{blast_radius, BlastRadius, GenerationId, Intent, Parameters};
use protea_storage::FitnessEntry;

use crate::extract::extract_code_block;
use crate::prompt::{system_prompt, user_prompt};
use crate::validate::validate_source;

/// Everything the orchestrator needs from the worker's run history, kept
/// narrow so it never has to import the kernel's shared state.
pub struct EvolveRequest {
    pub worker_dir: PathBuf,
    pub entrypoint: String,
    pub generation: GenerationId,
    pub params: Parameters,
    pub survived: bool,
    /// The Intent Classifier's (C5) verdict for this generation, carrying
    /// whatever signals (directive, persistent errors, crash logs, plateau)
    /// drove it — rendered into the user prompt in place of a raw directive
    /// string.
    pub intent: Intent,
    pub history: Vec<FitnessEntry>,
    pub top: Vec<FitnessEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvolveResult {
    pub success: bool,
    pub reason: String,
    pub new_source: Option<String>,
    /// How large a change the LLM made relative to the source it started
    /// from, present only on success.
    pub blast_radius: Option<BlastRadius>,
}

impl EvolveResult {
    fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: reason.into(),
            new_source: None,
            blast_radius: None,
        }
    }

    fn success(reason: impl Into<String>, old_source: &str, new_source: String) -> Self {
        let blast_radius = blast_radius(old_source, &new_source);
        Self {
            success: true,
            reason: reason.into(),
            new_source: Some(new_source),
            blast_radius: Some(blast_radius),
        }
    }
}

/// Narrow seam the kernel holds instead of a concrete orchestrator type.
#[async_trait]
pub trait Evolver: Send + Sync + 'static {
    async fn evolve(&self, request: EvolveRequest) -> EvolveResult;
}

pub struct EvolutionOrchestrator {
    llm: ClaudeClient,
}

impl EvolutionOrchestrator {
    pub fn new(llm: ClaudeClient) -> Self {
        Self { llm }
    }

    fn entrypoint_path(request: &EvolveRequest) -> PathBuf {
        request.worker_dir.join(&request.entrypoint)
    }

    async fn read_source(path: &Path) -> Result<String, String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("reading {}: {e}", path.display()))
    }
}

#[async_trait]
impl Evolver for EvolutionOrchestrator {
    async fn evolve(&self, request: EvolveRequest) -> EvolveResult {
        let path = Self::entrypoint_path(&request);

        let source = match Self::read_source(&path).await {
            Ok(s) => s,
            Err(reason) => return EvolveResult::failure(reason),
        };

        let system = system_prompt();
        let user = user_prompt(
            &source,
            request.generation,
            &request.params,
            request.survived,
            &request.intent,
            &request.history,
            &request.top,
        );

        let reply = match self.llm.send_message(&system, &user).await {
            Ok(r) => r,
            Err(e) => return EvolveResult::failure(format!("LLM request failed: {e}")),
        };

        let Some(candidate) = extract_code_block(&reply) else {
            return EvolveResult::failure("no fenced code block found in LLM reply");
        };

        if let Err(e) = validate_source(&candidate) {
            tracing::warn!(generation = %request.generation, error = %e, "evolved source failed validation");
            return EvolveResult::failure(e.to_string());
        }

        if let Err(e) = tokio::fs::write(&path, &candidate).await {
            return EvolveResult::failure(format!("writing {}: {e}", path.display()));
        }

        EvolveResult::success("evolution succeeded", &source, candidate)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
