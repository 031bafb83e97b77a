// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared, cloneable state handed to every route via axum's `State`
//! extractor: read-only handles onto the Shared Supervisor State, the
//! Fitness Log, and the skill catalog, plus the configured reports
//! directory and a clock for uptime rendering.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use protea_sentinel::SharedState;
use protea_storage::{FitnessLog, SkillCatalog};

#[derive(Clone)]
pub struct PortalState<C> {
    pub supervisor: Arc<SharedState>,
    pub fitness: Arc<Mutex<FitnessLog>>,
    pub skills: Arc<SkillCatalog>,
    pub reports_dir: PathBuf,
    pub clock: C,
}

impl<C> PortalState<C> {
    pub fn new(
        supervisor: Arc<SharedState>,
        fitness: Arc<Mutex<FitnessLog>>,
        skills: Arc<SkillCatalog>,
        reports_dir: PathBuf,
        clock: C,
    ) -> Self {
        Self {
            supervisor,
            fitness,
            skills,
            reports_dir,
            clock,
        }
    }
}
