// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent driver configuration.

use crate::sandbox_config::SandboxConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    Claude,
    Codex,
    Api,
}

crate::simple_display! {
    DriverKind {
        Claude => "claude",
        Codex => "codex",
        Api => "api",
    }
}

/// Declarative configuration for a single agent's driver invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub driver: DriverKind,
    pub model: String,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
    /// Inherited from the owning [`crate::profile::Profile`] at load time.
    pub sandbox: SandboxConfig,
    /// Inherited from the owning profile at load time.
    pub profile_name: String,
}
