// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat Monitor (C1): watches the worker's `.heartbeat` file.
//!
//! Parsing and freshness are pure functions in `protea_core::heartbeat`;
//! this module adds the OS-level PID-liveness probe and the async poll
//! loop, combining a `notify` file watch (fast path) with a periodic poll
//! fallback exactly as the teacher's `adapters::agent::watcher` does for
//! Claude session logs — so `is_alive()` stays correct even on platforms
//! where the watch event never fires.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};

use protea_core::{is_fresh, parse_heartbeat, Clock, Heartbeat, SystemClock};

/// Default poll fallback interval when no file-watch event arrives.
const POLL_FALLBACK_INTERVAL: Duration = Duration::from_millis(500);

#[cfg(unix)]
fn pid_exists(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(not(unix))]
fn pid_exists(_pid: u32) -> bool {
    true
}

/// Reads and evaluates the worker's heartbeat file.
pub struct HeartbeatMonitor<C: Clock = SystemClock> {
    path: PathBuf,
    timeout_sec: f64,
    clock: C,
}

impl HeartbeatMonitor<SystemClock> {
    pub fn new(path: impl Into<PathBuf>, timeout_sec: f64) -> Self {
        Self::with_clock(path, timeout_sec, SystemClock)
    }
}

impl<C: Clock> HeartbeatMonitor<C> {
    pub fn with_clock(path: impl Into<PathBuf>, timeout_sec: f64, clock: C) -> Self {
        Self {
            path: path.into(),
            timeout_sec,
            clock,
        }
    }

    /// Parse the heartbeat file. `None` on any I/O error or malformed
    /// content — treated identically to "not alive".
    pub fn read_heartbeat(&self) -> Option<Heartbeat> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        parse_heartbeat(&text)
    }

    /// Fresh timestamp *and* the OS reports the PID exists.
    pub fn is_alive(&self) -> bool {
        let Some(hb) = self.read_heartbeat() else {
            return false;
        };
        is_fresh(hb.timestamp, self.clock.now(), self.timeout_sec) && pid_exists(hb.pid)
    }

    /// Poll every 500ms until a live heartbeat appears or `startup_timeout`
    /// elapses. Returns whether one was observed.
    pub async fn wait_for_heartbeat(&self, startup_timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + startup_timeout;
        loop {
            if self.is_alive() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_FALLBACK_INTERVAL).await;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Spawn a background task that re-checks liveness on every file-write
/// notification, falling back to a periodic poll if the watch can't be
/// established (or never fires), and publishes the result on a `watch`
/// channel the kernel can observe without polling it directly.
pub fn spawn_liveness_watch<C: Clock>(
    monitor: std::sync::Arc<HeartbeatMonitor<C>>,
) -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(monitor.is_alive());

    tokio::spawn(async move {
        let (file_tx, mut file_rx) = mpsc::channel::<()>(8);
        let _watcher_guard = create_file_watcher(&monitor.path, file_tx);

        loop {
            tokio::select! {
                _ = file_rx.recv() => {}
                _ = tokio::time::sleep(POLL_FALLBACK_INTERVAL) => {}
            }
            let alive = monitor.is_alive();
            if tx.send(alive).is_err() {
                break;
            }
        }
    });

    rx
}

fn create_file_watcher(path: &Path, tx: mpsc::Sender<()>) -> Option<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
        if res.is_ok() {
            let _ = tx.try_send(());
        }
    })
    .inspect_err(|e| tracing::warn!(error = %e, "heartbeat file watcher unavailable, using poll fallback only"))
    .ok()?;

    if let Err(e) = watcher.watch(path, RecursiveMode::NonRecursive) {
        tracing::warn!(error = %e, path = %path.display(), "failed to watch heartbeat path, using poll fallback only");
        return None;
    }
    Some(watcher)
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
