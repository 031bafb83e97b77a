// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage for Protea: the Fitness Log's write-ahead log and
//! in-memory index, and the read-only skill catalog.

mod fitness;
mod skill_catalog;
mod wal;

pub use fitness::{FitnessEntry, FitnessLog, GenerationStats};
pub use skill_catalog::{Skill, SkillCatalog, SkillCatalogError};
pub use wal::{Wal, WalError};
