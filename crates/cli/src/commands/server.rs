// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amelia server` — run or inspect the amelia-api process.

use crate::client::AmeliaClient;
use crate::driver_factory::ProfileDriverFactory;
use crate::output::{format_or_json, OutputFormat};
use amelia_bus::Sequencer;
use amelia_core::{ServerSettings, SystemClock};
use amelia_scheduler::{Orchestrator, SchedulerConfig};
use amelia_store::{CheckpointStore, InMemoryStore, PgStore, StateStore};
use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct ServerArgs {
    #[command(subcommand)]
    pub command: ServerCommand,
}

#[derive(Subcommand)]
pub enum ServerCommand {
    /// Start the amelia-api server
    Start {
        /// Run in foreground and block until killed
        #[arg(long)]
        foreground: bool,
        /// Path to a TOML config file (see ServerSettings)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Check whether the server is reachable
    Status,
}

pub async fn server(args: ServerArgs, format: OutputFormat, api_url: &str) -> Result<()> {
    match args.command {
        ServerCommand::Start { foreground, config } => start(foreground, config, api_url).await,
        ServerCommand::Status => status(format, api_url).await,
    }
}

async fn start(foreground: bool, config: Option<PathBuf>, api_url: &str) -> Result<()> {
    if !foreground {
        let current_exe = std::env::current_exe()?;
        let mut command = std::process::Command::new(current_exe);
        command.arg("server").arg("start").arg("--foreground");
        if let Some(config) = &config {
            command.arg("--config").arg(config);
        }
        command.stdin(std::process::Stdio::null()).stdout(std::process::Stdio::null()).stderr(std::process::Stdio::null());
        command.spawn().map_err(|e| anyhow!("failed to spawn background server process: {e}"))?;
        println!("amelia-api starting in the background ({api_url})");
        return Ok(());
    }

    let settings = ServerSettings::load(config.as_deref())?;
    run_in_process(settings).await
}

/// Wires the orchestrator stack directly into `amelia-api` and serves until
/// interrupted. Storage backend follows `database_url`: a `postgres://` URL
/// gets a migrated [`PgStore`], anything else falls back to
/// [`InMemoryStore`] (the only other backend this crate ships).
async fn run_in_process(settings: ServerSettings) -> Result<()> {
    let (store, checkpoints): (Arc<dyn StateStore>, Arc<dyn CheckpointStore>) =
        if settings.database_url.starts_with("postgres") {
            let pg = Arc::new(PgStore::connect(&settings.database_url).await?);
            pg.migrate().await?;
            (pg.clone(), pg)
        } else {
            let in_memory = Arc::new(InMemoryStore::new());
            (in_memory.clone(), in_memory)
        };

    let bus = Arc::new(Sequencer::new(store.clone(), SystemClock));
    let driver_factory = Arc::new(ProfileDriverFactory::new());
    let scheduler_config = SchedulerConfig::default();
    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        checkpoints.clone(),
        bus.clone(),
        driver_factory.clone(),
        SystemClock,
        scheduler_config.clone(),
    ));

    orchestrator.recover_orphans().await?;

    let state = amelia_api::ApiState::new(store, checkpoints, bus, orchestrator.clone(), driver_factory, scheduler_config);

    tracing::info!(addr = %settings.bind_addr(), "starting amelia-api");
    amelia_api::serve_until(&settings, state, shutdown_signal()).await?;
    orchestrator.shutdown().await;
    Ok(())
}

/// Resolves once the process receives ctrl_c, handing `amelia-api` a
/// graceful-shutdown trigger and giving `run_in_process` a point after
/// which draining the orchestrator's active workflows is safe.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install ctrl_c handler");
    }
}

async fn status(format: OutputFormat, api_url: &str) -> Result<()> {
    let client = AmeliaClient::new(api_url);
    match client.health().await {
        Ok(true) => format_or_json(format, &serde_json::json!({"status": "running"}), || println!("amelia-api is running at {api_url}")),
        Ok(false) => format_or_json(format, &serde_json::json!({"status": "unhealthy"}), || println!("amelia-api at {api_url} reported an unhealthy status")),
        Err(e) if e.is_connection_refused() => {
            format_or_json(format, &serde_json::json!({"status": "not_running"}), || println!("amelia-api is not running at {api_url}"))
        }
        Err(e) => Err(anyhow!(e)),
    }
}
