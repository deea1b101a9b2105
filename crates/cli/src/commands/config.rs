// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amelia config` — inspect and edit server settings and profiles.

use crate::client::AmeliaClient;
use crate::output::{format_or_json, handle_list, OutputFormat};
use amelia_core::ProfileId;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::io::Write;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the running server's settings
    Show,
    /// Set `max_concurrent_workflows` on the running server
    SetMaxConcurrentWorkflows { value: usize },
    /// List configured profiles
    Profiles,
    /// Make a profile the active one
    ActivateProfile {
        #[arg(value_parser = parse_profile_id)]
        id: ProfileId,
    },
}

fn parse_profile_id(raw: &str) -> Result<ProfileId, std::convert::Infallible> {
    Ok(ProfileId::from(raw))
}

pub async fn config(args: ConfigArgs, format: OutputFormat, api_url: &str) -> Result<()> {
    let client = AmeliaClient::new(api_url);
    match args.command {
        ConfigCommand::Show => {
            let settings = client.get_settings().await?;
            format_or_json(format, &settings, || {
                println!("host: {}", settings.host);
                println!("port: {}", settings.port);
                println!("database_url: {}", settings.database_url);
                println!("max_concurrent_workflows: {}", settings.max_concurrent_workflows);
                println!("default_retry_budget: {}", settings.default_retry_budget);
                println!("retry_backoff_base_ms: {}", settings.retry_backoff_base_ms);
                println!("data_dir: {}", settings.data_dir.display());
            })
        }
        ConfigCommand::SetMaxConcurrentWorkflows { value } => {
            let mut settings = client.get_settings().await?;
            settings.max_concurrent_workflows = value;
            let updated = client.update_settings(&settings).await?;
            format_or_json(format, &updated, || println!("max_concurrent_workflows set to {value}"))
        }
        ConfigCommand::Profiles => {
            let profiles = client.list_profiles().await?;
            handle_list(format, &profiles, "no profiles configured", |items, out| {
                for profile in items {
                    let marker = if profile.is_active { "*" } else { " " };
                    let _ = writeln!(out, "{marker} {} ({}) tracker={}", profile.name, profile.id, profile.tracker);
                }
            })
        }
        ConfigCommand::ActivateProfile { id } => {
            let profile = client.activate_profile(id).await?;
            format_or_json(format, &profile, || println!("activated profile {} ({})", profile.name, profile.id))
        }
    }
}
