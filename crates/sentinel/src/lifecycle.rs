// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup and shutdown sequencing: [`bootstrap`] resolves the state
//! directory and opens the Fitness Log and Shared Supervisor State so the
//! binary entry point can hand the same handles to the portal; `init_logging`
//! sets up the file logger; `run_supervisor` wires the kernel, chat operator,
//! and task executor together and runs the graceful shutdown order — chat
//! operator first (no new commands), then the kernel drains its current
//! tick and stops the worker, then the task executor. The web portal is
//! spawned and stopped independently by the binary entry point since it has
//! no dependency on the kernel's state machine beyond a read-only snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use protea_adapters::{ClaudeClient, GitRevisionStore, LlmError, ProcessWorkerLifecycle, TelegramTransport};
use protea_core::{Clock, Config, ConfigError, SystemClock, UuidIdGen};
use protea_evolution::EvolutionOrchestrator;
use protea_storage::{FitnessLog, WalError};

use crate::chat::{ChatOperator, ChatOperatorConfig};
use crate::kernel::{Kernel, KernelConfig};
use crate::state::SharedState;
use crate::task::{TaskExecutor, TaskExecutorConfig};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fitness(#[from] WalError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("creating log directory {0}: {1}")]
    LogDir(PathBuf, std::io::Error),
}

/// Heartbeat interval and startup timeout multipliers relative to the
/// configured `heartbeat_timeout_sec`, mirroring the original sentinel's
/// ratio between "how often we check" and "how long we tolerate silence".
const STARTUP_TIMEOUT_MULTIPLIER: u32 = 4;

/// Set up the non-blocking, daily-rolling file logger. The returned guard
/// must be held for the process's lifetime — dropping it stops the
/// background writer thread.
pub fn init_logging(state_dir: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    let log_dir = state_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|e| LifecycleError::LogDir(log_dir.clone(), e))?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "protea.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// The pieces of startup the binary entry point needs before it can also
/// wire up the portal: the state directory, the Shared Supervisor State,
/// its task queue, and the Fitness Log, all sharing the process's single
/// `SharedState`/`FitnessLog` instances with whatever else reads them.
pub struct Bootstrap {
    pub state_dir: PathBuf,
    pub state: Arc<SharedState>,
    pub task_queue: crate::state::TaskQueueReceiver,
    pub fitness: Arc<Mutex<FitnessLog>>,
}

/// Resolve the state directory and open the Fitness Log and Shared
/// Supervisor State. Split out from [`run_supervisor`] so the portal (built
/// and owned entirely by the binary entry point) can share the same
/// `Arc<SharedState>`/`Arc<Mutex<FitnessLog>>` handles.
///
/// `config.fitness.db_path` is resolved relative to the state directory, not
/// the project root — the Fitness Log is process state, not project source.
pub fn bootstrap(project_root: &Path, config: &Config) -> Result<Bootstrap, LifecycleError> {
    let state_dir = protea_core::config::state_dir().unwrap_or_else(|_| project_root.join(".protea-state"));
    let fitness_path = state_dir.join(&config.fitness.db_path);
    let fitness = Arc::new(Mutex::new(FitnessLog::open(&fitness_path)?));
    let (state, task_queue) = SharedState::new(SystemClock.now());
    Ok(Bootstrap {
        state_dir,
        state,
        task_queue,
        fitness,
    })
}

/// Wire every component from an already-loaded `config` and `bootstrap`,
/// and run until `shutdown` resolves. Returns once the graceful shutdown
/// sequence completes.
pub async fn run_supervisor(
    project_root: &Path,
    config: &Config,
    bootstrap: Bootstrap,
    shutdown: tokio::sync::oneshot::Receiver<()>,
) -> Result<(), LifecycleError> {
    let Bootstrap {
        state_dir,
        state,
        task_queue,
        fitness,
    } = bootstrap;

    let secrets = protea_core::Secrets::from_env_with_dotenv(project_root);

    let worker_dir = project_root.join(&config.worker.path);
    let heartbeat_path = state_dir.join("heartbeat");

    let worker_lifecycle = Arc::new(ProcessWorkerLifecycle::new(config.worker.command.clone()));
    let revision_store = Arc::new(GitRevisionStore::new(&worker_dir));

    let evolver_llm = ClaudeClient::new(
        secrets.claude_api_key.clone(),
        config.evolution.claude_model.clone(),
        config.evolution.claude_max_tokens,
    )?;
    let evolver = Arc::new(EvolutionOrchestrator::new(evolver_llm));

    let kernel = Kernel::new(
        worker_lifecycle,
        revision_store,
        evolver,
        SystemClock,
        state.clone(),
        fitness.clone(),
        KernelConfig {
            worker_dir: worker_dir.clone(),
            entrypoint: worker_entrypoint(&config.worker.command),
            heartbeat_path: heartbeat_path.clone(),
            seed: config.evolution.seed,
            heartbeat_interval: std::time::Duration::from_secs(config.worker.heartbeat_interval_sec.into()),
            heartbeat_timeout_sec: f64::from(config.worker.heartbeat_timeout_sec),
            startup_timeout: std::time::Duration::from_secs(
                (config.worker.heartbeat_timeout_sec * STARTUP_TIMEOUT_MULTIPLIER).into(),
            ),
            plateau_window: config.evolution.plateau_window as usize,
            max_prompt_history: config.chat.max_prompt_history as usize,
            resources: config.resources.clone(),
        },
    );

    let (kernel_shutdown_tx, kernel_shutdown_rx) = tokio::sync::oneshot::channel();
    let kernel_task = tokio::spawn(async move { kernel.run(kernel_shutdown_rx).await });

    let mut chat_task = None;
    let mut chat_shutdown_tx = None;
    let mut task_executor_task = None;
    let mut task_executor_shutdown_tx = None;

    if config.chat.enabled {
        let transport = Arc::new(TelegramTransport::new(secrets.telegram_bot_token.clone()));
        let operator = ChatOperator::new(
            transport.clone(),
            state.clone(),
            fitness.clone(),
            UuidIdGen,
            SystemClock,
            ChatOperatorConfig {
                chat_id: secrets.telegram_chat_id.clone(),
                worker_dir: worker_dir.clone(),
                entrypoint: worker_entrypoint(&config.worker.command),
            },
        );
        let (tx, rx) = tokio::sync::oneshot::channel();
        chat_shutdown_tx = Some(tx);
        chat_task = Some(tokio::spawn(async move { operator.run(rx).await }));

        let task_llm = ClaudeClient::new(
            secrets.claude_api_key.clone(),
            config.evolution.claude_model.clone(),
            config.evolution.claude_max_tokens,
        )?;
        let executor = TaskExecutor::new(
            Arc::new(task_llm),
            transport,
            state.clone(),
            TaskExecutorConfig {
                worker_dir: worker_dir.clone(),
                entrypoint: worker_entrypoint(&config.worker.command),
            },
        );
        let (tx, rx) = tokio::sync::oneshot::channel();
        task_executor_shutdown_tx = Some(tx);
        task_executor_task = Some(tokio::spawn(async move { executor.run(task_queue, rx).await }));
    }

    shutdown.await.ok();
    tracing::info!("shutdown requested");

    // Chat operator stops first so no new commands arrive mid-shutdown.
    if let Some(tx) = chat_shutdown_tx {
        let _ = tx.send(());
    }
    if let Some(handle) = chat_task {
        let _ = handle.await;
    }

    // The kernel finishes its current tick and stops the worker before
    // returning.
    let _ = kernel_shutdown_tx.send(());
    let _ = kernel_task.await;

    // The task executor (and, externally, the portal) stop last.
    if let Some(tx) = task_executor_shutdown_tx {
        let _ = tx.send(());
    }
    if let Some(handle) = task_executor_task {
        let _ = handle.await;
    }

    Ok(())
}

fn worker_entrypoint(command: &[String]) -> String {
    command.last().cloned().unwrap_or_else(|| "main.py".to_string())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
