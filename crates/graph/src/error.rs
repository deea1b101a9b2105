// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("node {0:?} is not registered on this graph")]
    UnknownNode(String),

    #[error("graph has no entry point set")]
    MissingEntryPoint,

    #[error("conditional edge after {node:?} routed to unknown label {label:?}")]
    UnknownRoute { node: String, label: String },

    #[error("agent error: {0}")]
    Agent(#[from] amelia_agents::AgentError),

    #[error("{0}")]
    Config(String),
}
