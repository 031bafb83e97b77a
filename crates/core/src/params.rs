// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic parameter generation for evolution generations.
//!
//! Uses a seed-based RNG so every generation's parameters are reproducible:
//! for all `(seed, generation)`, repeated calls to [`generate_params`] return
//! bit-identical values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::id::GenerationId;

/// An immutable, deterministic parameter set for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub generation: GenerationId,
    pub seed: u64,
    /// 0.01 .. 0.50
    pub mutation_rate: f64,
    /// 2 .. 10
    pub population_size: u32,
    /// 240 .. 360
    pub max_runtime_sec: u32,
    /// 0.1 .. 0.9
    pub crossover_rate: f64,
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Build a deterministic parameter set for `generation` from `seed`.
///
/// The RNG is seeded from `seed + generation`, mirroring the reference
/// implementation's `random.Random(seed + generation)` formula.
pub fn generate_params(generation: GenerationId, seed: u64) -> Parameters {
    let rng_seed = seed.wrapping_add(generation.as_u64());
    let mut rng = StdRng::seed_from_u64(rng_seed);

    Parameters {
        generation,
        seed,
        mutation_rate: round4(rng.random_range(0.01..=0.50)),
        population_size: rng.random_range(2..=10),
        max_runtime_sec: rng.random_range(240..=360),
        crossover_rate: round4(rng.random_range(0.1..=0.9)),
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
