// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative invocation configuration.

use crate::agent_config::AgentConfig;
use crate::sandbox_config::SandboxConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

crate::define_id! {
    pub struct ProfileId("prf-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerKind {
    /// No issue-tracker integration; issue content comes from the request body.
    Noop,
    Github,
    Jira,
    Linear,
}

crate::simple_display! {
    TrackerKind {
        Noop => "noop",
        Github => "github",
        Jira => "jira",
        Linear => "linear",
    }
}

/// Agent names recognized by the pipeline graph.
pub const PIPELINE_AGENTS: &[&str] = &["architect", "developer", "reviewer", "evaluator"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub tracker: TrackerKind,
    pub working_dir_root: PathBuf,
    /// Where the architect writes the plan file, relative to `working_dir_root`.
    pub plan_output_dir: PathBuf,
    pub max_review_iterations: u32,
    pub max_plan_revisions: u32,
    pub agents: HashMap<String, AgentConfig>,
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub is_active: bool,
}

impl Profile {
    /// The configuration for a named pipeline agent, if the profile defines one.
    pub fn agent(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.get(name)
    }
}
