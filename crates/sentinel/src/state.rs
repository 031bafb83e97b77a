// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared Supervisor State (C6): a single object mediating between the
//! kernel, chat operator, and task executor. Mutable fields live behind a
//! `parking_lot::Mutex` for consistent, torn-read-free snapshots; `pause`,
//! `kill`, and the task queue are distinct primitives since they're
//! signals rather than readable state — the same "mutex for fields,
//! distinct primitives for signals" split the teacher's `EventBus`
//! practices for its own flag handling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

use protea_core::{GenerationId, SupervisorSnapshot, Task};

struct Fields {
    snapshot: SupervisorSnapshot,
    /// Set by the chat operator's `/directive` command, consumed exactly
    /// once by the kernel's next evolution step.
    pending_directive: Option<String>,
}

/// Shared between the kernel, chat operator, and task executor.
pub struct SharedState {
    fields: Mutex<Fields>,
    /// Level-triggered: honored every tick until explicitly cleared.
    pause: AtomicBool,
    /// Edge-triggered: the kernel clears it before acting, so a second
    /// `/kill` while one is already pending doesn't queue a double restart.
    kill: AtomicBool,
    kill_notify: Notify,
    /// Level-triggered: true while the task executor has an active task.
    p0_active: AtomicBool,
    task_tx: mpsc::UnboundedSender<Task>,
}

/// Exclusive handle to the task queue's receiving end — owned solely by
/// the Task Executor, never shared, so the queue never needs a lock of
/// its own held across an `.await`.
pub struct TaskQueueReceiver(mpsc::UnboundedReceiver<Task>);

impl TaskQueueReceiver {
    pub async fn recv(&mut self) -> Option<Task> {
        self.0.recv().await
    }
}

impl SharedState {
    pub fn new(start_wall_time: f64) -> (Arc<Self>, TaskQueueReceiver) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Self {
            fields: Mutex::new(Fields {
                snapshot: SupervisorSnapshot::starting(GenerationId::ZERO, start_wall_time),
                pending_directive: None,
            }),
            pause: AtomicBool::new(false),
            kill: AtomicBool::new(false),
            kill_notify: Notify::new(),
            p0_active: AtomicBool::new(false),
            task_tx,
        });
        (state, TaskQueueReceiver(task_rx))
    }

    /// A consistent, single-writer-at-a-time read of all fields.
    pub fn snapshot(&self) -> SupervisorSnapshot {
        let guard = self.fields.lock();
        SupervisorSnapshot {
            paused: self.pause.load(Ordering::SeqCst),
            p0_active: self.p0_active.load(Ordering::SeqCst),
            ..guard.snapshot
        }
    }

    /// Kernel writer: update progress fields for the current tick.
    pub fn update_progress(
        &self,
        generation_id: GenerationId,
        alive: bool,
        mutation_rate: f64,
        max_runtime_sec: u32,
    ) {
        let mut guard = self.fields.lock();
        guard.snapshot.generation_id = generation_id;
        guard.snapshot.alive = alive;
        guard.snapshot.mutation_rate = mutation_rate;
        guard.snapshot.max_runtime_sec = max_runtime_sec;
    }

    /// Kernel writer: record the outcome of the generation just recorded.
    pub fn record_outcome(&self, score: f64, survived: bool) {
        let mut guard = self.fields.lock();
        guard.snapshot.last_score = score;
        guard.snapshot.last_survived = survived;
    }

    pub fn set_pause(&self, paused: bool) {
        self.pause.store(paused, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.pause.load(Ordering::SeqCst)
    }

    /// Operator writer: request a kill. Wakes any kernel sleep in progress.
    pub fn request_kill(&self) {
        self.kill.store(true, Ordering::SeqCst);
        self.kill_notify.notify_one();
    }

    /// Kernel reader: check and clear the kill flag in one step, so the
    /// edge is consumed exactly once.
    pub fn take_kill(&self) -> bool {
        self.kill.swap(false, Ordering::SeqCst)
    }

    /// Resolves early if a kill is requested while the kernel is sleeping
    /// between ticks.
    pub async fn wait_for_kill_or(&self, duration: std::time::Duration) {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.kill_notify.notified() => {}
        }
    }

    pub fn set_p0_active(&self, active: bool) {
        self.p0_active.store(active, Ordering::SeqCst);
    }

    pub fn p0_active(&self) -> bool {
        self.p0_active.load(Ordering::SeqCst)
    }

    /// Operator writer: queue a directive for the kernel's next evolution
    /// step, overwriting any directive still pending.
    pub fn set_directive(&self, directive: String) {
        self.fields.lock().pending_directive = Some(directive);
    }

    /// Kernel reader: take and clear the pending directive, consumed
    /// exactly once, mirroring `take_kill`'s edge-triggered read.
    pub fn take_directive(&self) -> Option<String> {
        self.fields.lock().pending_directive.take()
    }

    /// Operator writer: enqueue an operator-submitted free-form task.
    pub fn enqueue_task(&self, task: Task) {
        // An unbounded channel closing only happens at shutdown; there's no
        // receiver left to care by then.
        let _ = self.task_tx.send(task);
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
