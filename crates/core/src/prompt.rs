// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned agent prompts.

use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct PromptId("pmt-");
}

/// A prompt's content is addressed by `(prompt_id, version_number)`; versions
/// are immutable once created, and the latest version is simply the one with
/// the highest `version_number` for a given `prompt_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptVersion {
    pub prompt_id: PromptId,
    pub version_number: u32,
    pub body: String,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: PromptId,
    pub name: String,
    pub agent: String,
    pub latest_version: u32,
}

impl Prompt {
    pub fn new(name: impl Into<String>, agent: impl Into<String>) -> Self {
        Self { id: PromptId::new(), name: name.into(), agent: agent.into(), latest_version: 0 }
    }
}
