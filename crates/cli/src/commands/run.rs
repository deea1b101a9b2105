// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amelia run` — create, start, and follow a workflow's events until it
//! reaches a terminal state.

use crate::client::{AmeliaClient, CreateWorkflowRequest};
use crate::output::OutputFormat;
use amelia_core::{Event, EventType, ProfileId};
use anyhow::{anyhow, Result};
use clap::Args;
use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;

#[derive(Args)]
pub struct RunArgs {
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
}

fn parse_profile_id(raw: &str) -> Result<ProfileId, std::convert::Infallible> {
    Ok(ProfileId::from(raw))
}

pub async fn run(args: RunArgs, format: OutputFormat, api_url: &str) -> Result<()> {
    let client = AmeliaClient::new(api_url);
    let created = client
        .create_workflow(&CreateWorkflowRequest {
            issue_id: args.issue_id,
            worktree_path: args.worktree_path,
            task_title: args.task_title,
            profile: args.profile,
            start: true,
        })
        .await?;

    println!("workflow {} started, following events (ctrl-c to detach)", created.workflow_id);
    follow(api_url, created.workflow_id, format).await
}

async fn follow(api_url: &str, workflow_id: amelia_core::WorkflowId, format: OutputFormat) -> Result<()> {
    let ws_url = to_ws_url(api_url, workflow_id);
    let (stream, _response) = tokio_tungstenite::connect_async(&ws_url).await.map_err(|e| anyhow!("failed to open event stream at {ws_url}: {e}"))?;
    let (_write, mut read) = stream.split();

    while let Some(message) = read.next().await {
        let message = message?;
        let Message::Text(payload) = message else { continue };
        let event: Event = serde_json::from_str(&payload)?;
        print_event(&event, format);
        if is_terminal(&event.event_type) {
            break;
        }
    }
    Ok(())
}

fn print_event(event: &Event, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(event).unwrap_or_default()),
        OutputFormat::Text => {
            println!("[{:>6}] {:<20} {}", event.sequence, event.event_type.as_wire_str(), event.message);
        }
    }
}

fn is_terminal(event_type: &EventType) -> bool {
    matches!(event_type, EventType::WorkflowCompleted | EventType::WorkflowFailed | EventType::WorkflowCancelled)
}

fn to_ws_url(api_url: &str, workflow_id: amelia_core::WorkflowId) -> String {
    let ws_base = if let Some(rest) = api_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("ws://{api_url}")
    };
    format!("{}/ws/events?workflow_id={}", ws_base.trim_end_matches('/'), workflow_id)
}
