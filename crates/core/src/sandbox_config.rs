// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox policy for a profile.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxMode {
    None,
    Container,
}

crate::simple_display! {
    SandboxMode {
        None => "none",
        Container => "container",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    pub mode: SandboxMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub network_allowlist_enabled: bool,
    #[serde(default)]
    pub network_allowed_hosts: Vec<String>,
}

impl SandboxConfig {
    pub fn none() -> Self {
        Self { mode: SandboxMode::None, image: None, network_allowlist_enabled: false, network_allowed_hosts: vec![] }
    }

    pub fn is_sandboxed(&self) -> bool {
        matches!(self.mode, SandboxMode::Container)
    }
}
