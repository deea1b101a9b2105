// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal brainstorm-session modeling.
//!
//! This type exists so the data model is complete, but nothing in
//! `amelia-scheduler` or `amelia-graph` wires a brainstorm session into the
//! implementation pipeline yet; see DESIGN.md for the resolution.

use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct BrainstormSessionId("brn-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrainstormRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainstormMessage {
    pub role: BrainstormRole,
    pub content: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainstormArtifact {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainstormSession {
    pub id: BrainstormSessionId,
    pub profile_id: crate::profile::ProfileId,
    #[serde(default)]
    pub messages: Vec<BrainstormMessage>,
    #[serde(default)]
    pub artifacts: Vec<BrainstormArtifact>,
}

impl BrainstormSession {
    pub fn new(profile_id: crate::profile::ProfileId) -> Self {
        Self { id: BrainstormSessionId::new(), profile_id, messages: Vec::new(), artifacts: Vec::new() }
    }
}
