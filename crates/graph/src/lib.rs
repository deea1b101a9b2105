// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! amelia-graph: the node/edge/state-update engine that runs the
//! implementation pipeline. Nodes are driver-backed steps
//! wrapping amelia-agents; the compiled graph streams `tasks`/`updates`
//! chunks and suspends at declared interrupt points rather than returning
//! a single final state, so the orchestrator can turn each chunk into a
//! sequenced workflow event as it happens.

pub mod builder;
pub mod chunk;
pub mod error;
pub mod node;
pub mod nodes;
pub mod pipeline;
pub mod state_update;

pub use builder::{CompiledGraph, GraphBuilder, END};
pub use chunk::{GraphChunk, InterruptPayload};
pub use error::GraphError;
pub use node::{Node, NodeContext};
pub use pipeline::{
    build_implementation_graph, NODE_ARCHITECT, NODE_DEVELOPER, NODE_HUMAN_APPROVAL, NODE_NEXT_TASK,
    NODE_PLAN_VALIDATOR, NODE_REVIEWER,
};
pub use state_update::{FieldReducer, StateUpdate};
