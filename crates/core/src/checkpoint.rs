// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque graph checkpoints.
//!
//! A checkpoint is the serialized [`crate::pipeline_state::PipelineState`]
//! plus enough graph-cursor metadata for `amelia-graph` to resume a paused
//! or interrupted workflow. `amelia-core` treats the state payload as opaque
//! JSON so it never needs to depend on `amelia-graph`.

use crate::workflow::WorkflowId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct CheckpointId("ckp-");
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub workflow_id: WorkflowId,
    /// Identifies the resumable point within the graph (e.g. the next node name).
    pub thread_id: String,
    pub next_node: Option<String>,
    pub state: serde_json::Value,
    pub created_at_ms: u64,
}

impl Checkpoint {
    pub fn new(workflow_id: WorkflowId, thread_id: impl Into<String>, next_node: Option<String>, state: serde_json::Value, created_at_ms: u64) -> Self {
        Self { id: CheckpointId::new(), workflow_id, thread_id: thread_id.into(), next_node, state, created_at_ms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checkpoint_carries_the_given_thread_id() {
        let cp = Checkpoint::new(WorkflowId::new(), "main", Some("developer".into()), serde_json::json!({}), 0);
        assert_eq!(cp.thread_id, "main");
        assert_eq!(cp.next_node.as_deref(), Some("developer"));
    }
}
