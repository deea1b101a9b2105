// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amelia start` — create (and optionally start) a workflow.

use crate::client::{AmeliaClient, CreateWorkflowRequest};
use crate::output::{format_or_json, OutputFormat};
use amelia_core::ProfileId;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct StartArgs {
    /// Tracker issue ID driving this workflow
    pub issue_id: String,
    /// Worktree path the workflow operates in
    pub worktree_path: String,
    /// Task title, only accepted when the active profile's tracker is noop
    #[arg(long)]
    pub task_title: Option<String>,
    /// Profile to run under (defaults to the active profile)
    #[arg(long, value_parser = parse_profile_id)]
    pub profile: Option<ProfileId>,
    /// Create the workflow without starting it immediately
    #[arg(long)]
    pub no_start: bool,
}

fn parse_profile_id(raw: &str) -> Result<ProfileId, std::convert::Infallible> {
    Ok(ProfileId::from(raw))
}

pub async fn start(args: StartArgs, format: OutputFormat, api_url: &str) -> Result<()> {
    let client = AmeliaClient::new(api_url);
    let request = CreateWorkflowRequest {
        issue_id: args.issue_id,
        worktree_path: args.worktree_path,
        task_title: args.task_title,
        profile: args.profile,
        start: !args.no_start,
    };

    let created = client.create_workflow(&request).await?;
    format_or_json(format, &created, || {
        println!("workflow {} created ({})", created.workflow_id, created.status);
    })
}
