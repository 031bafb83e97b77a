// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker Lifecycle Manager: starts and stops the supervised worker child
//! process. Grounded in the teacher's `TmuxAdapter` idiom (precondition
//! checks, structured `tracing`, a domain error enum instead of raw
//! `io::Error`) but spawns a direct child process rather than a tmux pane,
//! matching the original's `subprocess.Popen` usage in `ring0/sentinel.py`.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use protea_core::CrashLog;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker directory does not exist: {0}")]
    MissingWorkerDir(PathBuf),
    #[error("failed to spawn worker: {0}")]
    SpawnFailed(std::io::Error),
    #[error("failed to signal worker: {0}")]
    SignalFailed(std::io::Error),
}

/// How many trailing stderr lines are kept as crash evidence. Mirrors a
/// tail, not a full capture — enough for the Intent Classifier's error
/// signals without holding a runaway worker's entire output in memory.
const STDERR_TAIL_LINES: usize = 20;

/// A running worker process.
pub struct WorkerHandle {
    pub pid: u32,
    child: Child,
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
}

impl WorkerHandle {
    /// Join the captured stderr tail into a single crash-log entry. Empty
    /// if the worker never wrote to stderr (or stdio capture failed).
    pub fn crash_log(&self) -> CrashLog {
        let tail = self.stderr_tail.lock();
        CrashLog {
            content: tail.iter().cloned().collect::<Vec<_>>().join("\n"),
        }
    }
}

/// Starts and stops the supervised worker. Only one worker may be live at
/// a time — the kernel is responsible for not calling `start` twice without
/// an intervening `stop`.
#[async_trait]
pub trait WorkerLifecycle: Send + Sync + 'static {
    async fn start(&self, worker_dir: &Path, heartbeat_path: &Path) -> Result<WorkerHandle, WorkerError>;

    /// Graceful termination, waiting up to 5s, then forced. A `None` handle
    /// (already stopped) is a no-op.
    async fn stop(&self, handle: Option<WorkerHandle>);
}

/// Direct child-process worker adapter, the production implementation.
#[derive(Clone, Default)]
pub struct ProcessWorkerLifecycle {
    command: Vec<String>,
}

impl ProcessWorkerLifecycle {
    /// `command` is the argv used to launch the worker, e.g.
    /// `["python3", "main.py"]`, resolved relative to `worker_dir`.
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

const GRACEFUL_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
impl WorkerLifecycle for ProcessWorkerLifecycle {
    async fn start(&self, worker_dir: &Path, heartbeat_path: &Path) -> Result<WorkerHandle, WorkerError> {
        if !worker_dir.exists() {
            return Err(WorkerError::MissingWorkerDir(worker_dir.to_path_buf()));
        }

        let Some((program, args)) = self.command.split_first() else {
            return Err(WorkerError::SpawnFailed(std::io::Error::other("empty worker command")));
        };

        let mut env: HashMap<String, String> = std::env::vars().collect();
        env.insert("WORKER_HEARTBEAT".to_string(), heartbeat_path.display().to_string());

        let mut child = Command::new(program)
            .args(args)
            .current_dir(worker_dir)
            .envs(&env)
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let pid = child.id().unwrap_or(0);
        let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
        if let Some(stderr) = child.stderr.take() {
            let tail = stderr_tail.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let mut buf = tail.lock();
                    if buf.len() == STDERR_TAIL_LINES {
                        buf.pop_front();
                    }
                    buf.push_back(line);
                }
            });
        }

        tracing::info!(pid, worker_dir = %worker_dir.display(), "worker started");
        Ok(WorkerHandle { pid, child, stderr_tail })
    }

    async fn stop(&self, handle: Option<WorkerHandle>) {
        let Some(mut handle) = handle else {
            return;
        };

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;
            if let Err(e) = kill(Pid::from_raw(handle.pid as i32), Signal::SIGTERM) {
                tracing::warn!(pid = handle.pid, error = %e, "SIGTERM failed, falling back to forced kill");
            }
        }
        #[cfg(not(unix))]
        {
            let _ = handle.child.start_kill();
        }

        match timeout(GRACEFUL_STOP_TIMEOUT, handle.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(pid = handle.pid, ?status, "worker stopped gracefully");
            }
            _ => {
                tracing::warn!(pid = handle.pid, "worker did not exit in time, killing");
                let _ = handle.child.start_kill();
                let _ = handle.child.wait().await;
            }
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
