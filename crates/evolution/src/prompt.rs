// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt assembly for the Evolution Orchestrator (C8 step 2-3): builds the
//! system prompt (hard constraints) and the user prompt (source + fitness
//! history) submitted to the LLM.

use protea_core::{GenerationId, Intent, Parameters};
use protea_storage::FitnessEntry;

/// Name of the environment variable the worker must read its heartbeat
/// path from — referenced in the system prompt and checked by
/// [`super::validate::references_heartbeat_env`].
pub const HEARTBEAT_ENV_VAR: &str = "WORKER_HEARTBEAT";

/// Hard constraints the mutated source must satisfy, independent of intent.
pub fn system_prompt() -> String {
    format!(
        "You are evolving the source code of a long-running worker process.\n\
         Hard constraints:\n\
         - The program MUST periodically write its heartbeat to the path in the \
         `{HEARTBEAT_ENV_VAR}` environment variable.\n\
         - The program MUST define a callable entrypoint that runs when the file \
         is executed.\n\
         - Return ONLY the complete new source for the entrypoint file, inside a \
         single fenced code block.\n\
         - Do not explain your changes outside the code block."
    )
}

/// Build the user prompt: current source, recent fitness history, top
/// performers, generation parameters, and the classified evolution intent.
pub fn user_prompt(
    source: &str,
    generation: GenerationId,
    params: &Parameters,
    survived: bool,
    intent: &Intent,
    history: &[FitnessEntry],
    top: &[FitnessEntry],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Generation: {generation}\n"));
    out.push_str(&format!("Survived last run: {survived}\n"));
    out.push_str(&format!(
        "Parameters: mutation_rate={:.4} population_size={} max_runtime_sec={} crossover_rate={:.4}\n",
        params.mutation_rate, params.population_size, params.max_runtime_sec, params.crossover_rate
    ));
    out.push_str(&format!("Intent: {}\n", intent.name()));
    for signal in intent.signals() {
        out.push_str(&format!("Signal: {signal}\n"));
    }

    if !top.is_empty() {
        out.push_str("\nTop performers:\n");
        for entry in top {
            out.push_str(&format!(
                "- gen {} score={:.2} survived={} revision={}\n",
                entry.generation_id,
                entry.score,
                entry.survived,
                entry.revision_id.short(8)
            ));
        }
    }

    if !history.is_empty() {
        out.push_str("\nRecent history:\n");
        for entry in history {
            out.push_str(&format!(
                "- gen {} score={:.2} survived={} runtime={:.0}s\n",
                entry.generation_id, entry.score, entry.survived, entry.runtime_sec
            ));
        }
    }

    out.push_str("\nCurrent source:\n");
    out.push_str(source);
    out
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
