// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The frozen pipeline state the graph threads through its nodes.
//!
//! Values of this type are never mutated in place. A node returns a sparse
//! [`crate::StateUpdate`]-shaped map (defined in `amelia-graph`, which
//! depends on this crate) that a single merge routine applies according to
//! each field's declared reducer. `amelia-core` only owns the shape of the
//! state; the merge logic lives in `amelia-graph` because it is inseparable
//! from the graph's node/edge machinery.

use crate::profile::ProfileId;
use crate::workflow::WorkflowId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineType {
    Implementation,
    PlanOnly,
    ReviewOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgenticStatus {
    Running,
    Paused,
    Completed,
    Failed,
}

/// A single entry in the append-only observability trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ts_ms: u64,
    pub actor: String,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
}

/// A tool invocation captured during agentic execution (driver-agnostic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub call_id: String,
    pub name: String,
    pub input: serde_json::Value,
}

/// The paired result of a [`ToolCallRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultRecord {
    pub call_id: String,
    pub name: String,
    pub output: String,
    pub is_error: bool,
}

/// A single consultation with the out-of-core Oracle collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConsultation {
    pub problem: String,
    pub advice: String,
    pub ts_ms: u64,
}

/// A structured reviewer verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReview {
    pub approved: bool,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// A single-turn evaluator verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub verdict: String,
    #[serde(default)]
    pub rationale: Option<String>,
}

/// The base pipeline state plus the implementation-pipeline fields.
///
/// Every list field here carries "merge = append" in `amelia-graph`'s
/// reducer table; every scalar carries "merge = replace".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub workflow_id: WorkflowId,
    pub pipeline_type: PipelineType,
    pub profile_id: ProfileId,

    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    pub pending_user_input: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,

    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    #[serde(default)]
    pub tool_results: Vec<ToolResultRecord>,
    pub agentic_status: AgenticStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_path: Option<String>,
    #[serde(default)]
    pub plan_revision_count: u32,
    /// Issues raised by the most recent plan validation pass, fed back into
    /// the architect's next prompt on a `revise` route. Cleared once the
    /// architect has read them for its next run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_validation_issues: Option<Vec<String>>,

    #[serde(default)]
    pub review_iteration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tasks: Option<u32>,
    #[serde(default)]
    pub current_task_index: u32,
    #[serde(default)]
    pub task_review_iteration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_review: Option<StructuredReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_result: Option<EvaluationResult>,
    #[serde(default)]
    pub approved_items: Vec<String>,
    #[serde(default)]
    pub auto_approve: bool,
    #[serde(default)]
    pub review_pass: u32,
    pub max_review_passes: u32,
    /// Copied from the profile at workflow creation so the plan-validator
    /// routing decision (approved/revise/escalate) only needs `&PipelineState`.
    pub max_plan_revisions: u32,
    pub workflow_status: crate::workflow::WorkflowStatus,
    #[serde(default)]
    pub oracle_consultations: Vec<OracleConsultation>,
    /// Set by `plan_validator` when it routes to `escalate` rather than
    /// `approved`; carried onto the `human_approval` interrupt so the
    /// scheduler can tell an ordinary approval pause from one forced by an
    /// exhausted revision budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupt_reason: Option<String>,
}

impl PipelineState {
    /// A fresh state for a new workflow, with no history and no plan yet.
    pub fn new(
        workflow_id: WorkflowId,
        profile_id: ProfileId,
        pipeline_type: PipelineType,
        max_review_passes: u32,
        max_plan_revisions: u32,
    ) -> Self {
        Self {
            workflow_id,
            pipeline_type,
            profile_id,
            history: Vec::new(),
            pending_user_input: false,
            user_message: None,
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            agentic_status: AgenticStatus::Running,
            driver_session_id: None,
            final_response: None,
            error: None,
            issue: None,
            design: None,
            goal: None,
            plan_markdown: None,
            plan_path: None,
            plan_revision_count: 0,
            plan_validation_issues: None,
            review_iteration: 0,
            total_tasks: None,
            current_task_index: 0,
            task_review_iteration: 0,
            structured_review: None,
            evaluation_result: None,
            approved_items: Vec::new(),
            auto_approve: false,
            review_pass: 0,
            max_review_passes,
            max_plan_revisions,
            workflow_status: crate::workflow::WorkflowStatus::Pending,
            oracle_consultations: Vec::new(),
            interrupt_reason: None,
        }
    }
}
