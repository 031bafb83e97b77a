// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Supervisor Kernel (C12): the generation lifecycle state machine.
//! Owns the worker process handle exclusively; every other component
//! reaches it only through [`crate::state::SharedState`] or the Fitness
//! Log's shared reader handle.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use protea_adapters::{HeartbeatMonitor, ResourceSample, RevisionStore, WorkerHandle, WorkerLifecycle};
use protea_core::{classify_intent, generate_params, Clock, CrashLog, GenerationId, Parameters, ResourceConfig, RevisionId};
use protea_evolution::{EvolveRequest, Evolver};
use protea_storage::FitnessLog;

use crate::state::SharedState;

/// Score assigned to a generation that reached `max_runtime_sec` alive.
const SURVIVED_SCORE: f64 = 1.0;
/// Upper clamp on a died-early score so it never reaches the survived score.
const DIED_SCORE_CAP: f64 = 0.99;
/// How many recent died-generation crash logs feed the Intent Classifier.
const RECENT_CRASH_LOGS_CAP: usize = 5;
/// An error line recurring in at least this many recent crash logs counts
/// as a persistent error rather than a one-off crash.
const PERSISTENT_ERROR_MIN_OCCURRENCES: usize = 2;

/// Error lines that recur across at least
/// [`PERSISTENT_ERROR_MIN_OCCURRENCES`] of the recent crash logs, as
/// distinct from `crash_logs` itself (just the latest evidence).
fn persistent_errors(recent: &VecDeque<CrashLog>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for log in recent {
        let mut seen_in_log = HashSet::new();
        for line in log.content.lines() {
            let line = line.trim();
            if !line.is_empty() && seen_in_log.insert(line) {
                *counts.entry(line).or_insert(0) += 1;
            }
        }
    }
    let mut errors: Vec<String> = counts
        .into_iter()
        .filter(|&(_, count)| count >= PERSISTENT_ERROR_MIN_OCCURRENCES)
        .map(|(line, _)| line.to_string())
        .collect();
    errors.sort();
    errors
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Starting,
    Running,
    Restarting { advance_generation: bool },
}

/// The outcome of one `RUNNING` tick's control-flag and terminal-condition
/// check, factored out as a pure function so the tie-break rules are
/// testable without a live worker process or clock.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TickDecision {
    Stay,
    Killed,
    Survived { score: f64 },
    Died { score: f64 },
}

/// Decide the next phase for a `RUNNING` tick.
///
/// Order matters for the two documented tie-breaks: kill is checked before
/// pause (an explicit kill always wins over the pause throttle), and the
/// survived threshold is checked before the died threshold (if the
/// heartbeat goes stale in the same tick `max_runtime_sec` is reached,
/// the generation is still recorded as survived — reward precedes
/// punishment).
fn decide(paused: bool, kill_requested: bool, alive: bool, elapsed: f64, max_runtime_sec: u32) -> TickDecision {
    if kill_requested {
        return TickDecision::Killed;
    }
    if paused {
        return TickDecision::Stay;
    }

    let max_runtime = f64::from(max_runtime_sec);
    if elapsed >= max_runtime {
        return TickDecision::Survived { score: SURVIVED_SCORE };
    }
    if !alive {
        return TickDecision::Died {
            score: (elapsed / max_runtime).min(DIED_SCORE_CAP),
        };
    }
    TickDecision::Stay
}

/// Configuration the kernel needs that doesn't belong in `SharedState`.
pub struct KernelConfig {
    pub worker_dir: PathBuf,
    pub entrypoint: String,
    pub heartbeat_path: PathBuf,
    pub seed: u64,
    pub heartbeat_interval: Duration,
    pub heartbeat_timeout_sec: f64,
    pub startup_timeout: Duration,
    pub plateau_window: usize,
    pub max_prompt_history: usize,
    pub resources: ResourceConfig,
}

pub struct Kernel<W, R, E, C> {
    worker_lifecycle: Arc<W>,
    revision_store: Arc<R>,
    evolver: Arc<E>,
    clock: C,
    state: Arc<SharedState>,
    fitness: Arc<Mutex<FitnessLog>>,
    config: KernelConfig,
}

impl<W, R, E, C> Kernel<W, R, E, C>
where
    W: WorkerLifecycle,
    R: RevisionStore,
    E: Evolver,
    C: Clock,
{
    pub fn new(
        worker_lifecycle: Arc<W>,
        revision_store: Arc<R>,
        evolver: Arc<E>,
        clock: C,
        state: Arc<SharedState>,
        fitness: Arc<Mutex<FitnessLog>>,
        config: KernelConfig,
    ) -> Self {
        Self {
            worker_lifecycle,
            revision_store,
            evolver,
            clock,
            state,
            fitness,
            config,
        }
    }

    /// Run the generation state machine until `shutdown` resolves. The
    /// current worker, if any, is stopped before returning.
    pub async fn run(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        self.revision_store
            .init_repo()
            .await
            .unwrap_or_else(|e| tracing::error!(error = %e, "revision store init failed"));

        let mut generation = GenerationId::ZERO;
        let mut last_good_revision = self
            .revision_store
            .current_hash()
            .await
            .unwrap_or_else(|_| RevisionId::new(""));
        let mut params = generate_params(generation, self.config.seed);
        let mut phase = Phase::Starting;
        let mut worker: Option<WorkerHandle> = None;
        let mut run_start = self.clock.now();
        let mut recent_crash_logs: VecDeque<CrashLog> = VecDeque::with_capacity(RECENT_CRASH_LOGS_CAP);

        loop {
            if shutdown.try_recv().is_ok() {
                break;
            }

            phase = match phase {
                Phase::Starting => {
                    worker = self.spawn_generation(&params).await;
                    run_start = self.clock.now();
                    Phase::Running
                }
                Phase::Running => {
                    self.tick(
                        generation,
                        &params,
                        &mut worker,
                        &mut last_good_revision,
                        &mut recent_crash_logs,
                        run_start,
                    )
                    .await
                }
                Phase::Restarting { advance_generation } => {
                    if advance_generation {
                        generation = generation.next();
                        params = generate_params(generation, self.config.seed);
                    }
                    Phase::Starting
                }
            };

            if matches!(phase, Phase::Starting) {
                // About to spawn; give the shutdown signal one more chance
                // to interrupt before committing to another generation.
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(Duration::from_millis(1)) => {}
                }
            }
        }

        self.worker_lifecycle.stop(worker).await;
    }

    async fn spawn_generation(&self, params: &Parameters) -> Option<WorkerHandle> {
        match self
            .worker_lifecycle
            .start(&self.config.worker_dir, &self.config.heartbeat_path)
            .await
        {
            Ok(handle) => {
                let monitor = HeartbeatMonitor::with_clock(
                    self.config.heartbeat_path.clone(),
                    self.config.heartbeat_timeout_sec,
                    self.clock.clone(),
                );
                monitor.wait_for_heartbeat(self.config.startup_timeout).await;
                self.state.update_progress(
                    params.generation,
                    monitor.is_alive(),
                    params.mutation_rate,
                    params.max_runtime_sec,
                );
                Some(handle)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn worker");
                None
            }
        }
    }

    /// One `RUNNING` tick: update shared state, check control flags and
    /// terminal conditions, and decide the next phase.
    async fn tick(
        &self,
        generation: GenerationId,
        params: &Parameters,
        worker: &mut Option<WorkerHandle>,
        last_good_revision: &mut RevisionId,
        recent_crash_logs: &mut VecDeque<CrashLog>,
        run_start: f64,
    ) -> Phase {
        self.state.wait_for_kill_or(self.config.heartbeat_interval).await;

        let sample = ResourceSample::take(Path::new("/"));
        if let Some(alert) = sample.check(&self.config.resources) {
            tracing::warn!(alert, "resource ceiling exceeded");
        }

        let monitor = HeartbeatMonitor::with_clock(
            self.config.heartbeat_path.clone(),
            self.config.heartbeat_timeout_sec,
            self.clock.clone(),
        );
        let alive = monitor.is_alive();
        let elapsed = self.clock.now() - run_start;

        self.state
            .update_progress(generation, alive, params.mutation_rate, params.max_runtime_sec);

        let kill_requested = self.state.take_kill();
        let paused = self.state.is_paused();

        match decide(paused, kill_requested, alive, elapsed, params.max_runtime_sec) {
            TickDecision::Stay => Phase::Running,
            TickDecision::Killed => {
                self.worker_lifecycle.stop(worker.take()).await;
                Phase::Restarting { advance_generation: false }
            }
            TickDecision::Survived { score } => {
                self.record(generation, params, worker, last_good_revision, recent_crash_logs, score, elapsed, true)
                    .await
            }
            TickDecision::Died { score } => {
                self.record(generation, params, worker, last_good_revision, recent_crash_logs, score, elapsed, false)
                    .await
            }
        }
    }

    async fn record(
        &self,
        generation: GenerationId,
        params: &Parameters,
        worker: &mut Option<WorkerHandle>,
        last_good_revision: &mut RevisionId,
        recent_crash_logs: &mut VecDeque<CrashLog>,
        score: f64,
        elapsed: f64,
        survived: bool,
    ) -> Phase {
        if !survived {
            if let Some(log) = worker.as_ref().map(WorkerHandle::crash_log) {
                if !log.content.is_empty() {
                    if recent_crash_logs.len() == RECENT_CRASH_LOGS_CAP {
                        recent_crash_logs.pop_front();
                    }
                    recent_crash_logs.push_back(log);
                }
            }
        }
        self.worker_lifecycle.stop(worker.take()).await;

        {
            let mut fitness = self.fitness.lock();
            if let Err(e) = fitness.record(generation, last_good_revision.clone(), score, elapsed, survived) {
                tracing::error!(error = %e, "failed to record fitness entry");
            }
        }
        self.state.record_outcome(score, survived);

        if survived {
            match self.revision_store.snapshot(&format!("gen-{generation} survived")).await {
                Ok(revision) => *last_good_revision = revision,
                Err(e) => tracing::error!(error = %e, "survived snapshot failed"),
            }
        } else if let Err(e) = self.revision_store.rollback(last_good_revision).await {
            tracing::error!(error = %e, "rollback failed");
        }

        if self.state.p0_active() {
            return Phase::Restarting { advance_generation: true };
        }

        self.evolve(generation, params, survived, last_good_revision, recent_crash_logs).await;
        Phase::Restarting { advance_generation: true }
    }

    async fn evolve(
        &self,
        generation: GenerationId,
        params: &Parameters,
        survived: bool,
        last_good_revision: &mut RevisionId,
        recent_crash_logs: &VecDeque<CrashLog>,
    ) {
        let (history, top, plateaued) = {
            let fitness = self.fitness.lock();
            (
                fitness.history(self.config.max_prompt_history).into_iter().cloned().collect::<Vec<_>>(),
                fitness.top(5).into_iter().cloned().collect::<Vec<_>>(),
                fitness.is_plateaued(self.config.plateau_window),
            )
        };

        let directive = self.state.take_directive().unwrap_or_default();
        let persistent = persistent_errors(recent_crash_logs);
        let crash_logs: Vec<CrashLog> = recent_crash_logs.iter().cloned().collect();
        let intent = classify_intent(survived, plateaued, &persistent, &crash_logs, &directive);

        let request = EvolveRequest {
            worker_dir: self.config.worker_dir.clone(),
            entrypoint: self.config.entrypoint.clone(),
            generation,
            params: *params,
            survived,
            intent,
            history,
            top,
        };

        let result = self.evolver.evolve(request).await;
        if !result.success {
            tracing::info!(generation = %generation, reason = %result.reason, "evolution did not produce new source");
            return;
        }
        if let Some(blast) = &result.blast_radius {
            tracing::info!(generation = %generation, scope = ?blast.scope, lines_changed = blast.lines_changed, "evolution mutated source");
        }

        let phase = if survived { "evolved" } else { "evolved-from-rollback" };
        match self.revision_store.snapshot(&format!("gen-{generation} {phase}")).await {
            Ok(revision) => *last_good_revision = revision,
            Err(e) => tracing::error!(error = %e, "post-evolution snapshot failed"),
        }
    }
}

#[cfg(test)]
#[path = "kernel_tests.rs"]
mod tests;
