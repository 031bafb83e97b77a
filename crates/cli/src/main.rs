// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! protea - the Protea supervisor CLI. A single `run` command: load
//! configuration, wire the supervisor kernel and (if enabled) the web
//! portal, and run both until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "protea", version, about = "Self-evolving code agent supervisor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the supervisor (and web portal, if enabled) until interrupted.
    Run,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let Command::Run = Cli::parse().command;
    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let project_root = std::env::current_dir().context("reading current directory")?;
    let config = protea_core::Config::load(&project_root)?;

    let bootstrap = protea_sentinel::bootstrap(&project_root, &config)?;
    let _log_guard = protea_sentinel::init_logging(&bootstrap.state_dir)?;

    let portal = if config.portal.enabled {
        Some(spawn_portal(&project_root, &config, &bootstrap).context("starting web portal")?)
    } else {
        None
    };

    let (sentinel_shutdown_tx, sentinel_shutdown_rx) = tokio::sync::oneshot::channel();
    let mut sentinel_task = {
        let project_root = project_root.clone();
        let config = config.clone();
        tokio::spawn(async move { protea_sentinel::run_supervisor(&project_root, &config, bootstrap, sentinel_shutdown_rx).await })
    };

    // Race Ctrl-C against the supervisor task itself: a startup failure
    // inside `run_supervisor` (e.g. a missing Claude API key) must exit
    // promptly rather than wait for an interrupt that will never come.
    // Borrowing the join handle (rather than moving it into the branch)
    // keeps it available to await again once Ctrl-C wins the race.
    let sentinel_result = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            let _ = sentinel_shutdown_tx.send(());
            sentinel_task.await.context("supervisor task panicked")?
        }
        result = &mut sentinel_task => {
            result.context("supervisor task panicked")?
        }
    };
    sentinel_result?;

    // The portal stops last, after the supervisor has finished its shutdown
    // sequence, per the documented ordering.
    if let Some((shutdown_tx, portal_task)) = portal {
        let _ = shutdown_tx.send(());
        portal_task.await.context("portal task panicked")??;
    }

    Ok(())
}

type PortalHandle = (
    tokio::sync::oneshot::Sender<()>,
    tokio::task::JoinHandle<Result<(), protea_portal::PortalError>>,
);

fn spawn_portal(project_root: &std::path::Path, config: &protea_core::Config, bootstrap: &protea_sentinel::Bootstrap) -> Result<PortalHandle> {
    let skills_path = project_root.join(&config.portal.skill_catalog_path);
    let skills = Arc::new(protea_storage::SkillCatalog::load(&skills_path).context("loading skill catalog")?);
    let reports_dir = project_root.join(&config.portal.reports_dir);

    let portal_state = protea_portal::PortalState::new(
        bootstrap.state.clone(),
        bootstrap.fitness.clone(),
        skills,
        reports_dir,
        protea_core::SystemClock,
    );

    let host = config.portal.host.clone();
    let port = config.portal.port;
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let task = tokio::spawn(async move { protea_portal::run_portal(portal_state, &host, port, shutdown_rx).await });
    Ok((shutdown_tx, task))
}
