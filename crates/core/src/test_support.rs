// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders for fixture construction, shared across crates via the
//! `test-support` feature.

use crate::event::{Event, EventLevel, EventType};
use crate::pipeline_state::{AgenticStatus, PipelineState, PipelineType};
use crate::profile::ProfileId;
use crate::workflow::{Workflow, WorkflowId, WorkflowStatus, WorkflowType};
use std::path::PathBuf;

crate::builder! {
    pub struct WorkflowBuilder => Workflow {
        into { issue_id: String = "issue-1" }
        set { worktree_path: PathBuf = PathBuf::from("/tmp/amelia/wt") }
        set { profile_id: ProfileId = ProfileId::new() }
        set { workflow_type: WorkflowType = WorkflowType::Full }
        set { status: WorkflowStatus = WorkflowStatus::Pending }
        set { created_at_ms: u64 = 0 }
        option { started_at_ms: u64 = None }
        option { completed_at_ms: u64 = None }
        option { planned_at_ms: u64 = None }
        option { failure_reason: String = None }
        option { plan_cache: String = None }
        option { issue_cache: serde_json::Value = None }
        computed { id: WorkflowId = WorkflowId::new() }
    }
}

crate::builder! {
    pub struct EventBuilder => Event {
        set { workflow_id: WorkflowId = WorkflowId::new() }
        set { sequence: u64 = 1 }
        set { timestamp_ms: u64 = 0 }
        set { level: EventLevel = EventLevel::Info }
        set { event_type: EventType = EventType::WorkflowStarted }
        option { agent: String = None }
        into { message: String = "" }
        set { data: serde_json::Value = serde_json::json!({}) }
        set { is_error: bool = false }
        computed { id: crate::event::EventId = crate::event::EventId::new() }
    }
}

/// Builds a minimal [`PipelineState`] for a freshly started implementation
/// pipeline, with a given number of already-approved plan revisions.
pub fn fixture_pipeline_state(workflow_id: WorkflowId, profile_id: ProfileId) -> PipelineState {
    let mut state = PipelineState::new(workflow_id, profile_id, PipelineType::Implementation, 3, 2);
    state.agentic_status = AgenticStatus::Running;
    state
}
