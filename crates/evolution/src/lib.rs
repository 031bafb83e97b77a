// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Evolution Orchestrator (C8): prompt assembly, LLM submission,
//! source validation, and the worker entrypoint rewrite. Intent
//! classification (C5) and parameter generation (C4) are pure functions
//! that live in `protea-core` since every crate needs them; this crate
//! only houses the orchestration that calls out to the LLM adapter.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod extract;
mod orchestrator;
mod prompt;
mod validate;

pub use extract::extract_code_block;
pub use orchestrator::{EvolutionOrchestrator, EvolveRequest, EvolveResult, Evolver};
pub use prompt::{system_prompt, user_prompt, HEARTBEAT_ENV_VAR};
pub use validate::{references_heartbeat_env, validate_source, ValidationError};
