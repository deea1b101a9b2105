// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sparse node output and the single merge routine that folds it into a
//! [`PipelineState`]. Every field here mirrors one on `PipelineState`; a
//! node only sets the fields it actually touched and leaves the rest
//! `None`/empty, merged via a single declared reducer per field rather
//! than ad hoc per-type `merge` impls.

use amelia_core::{
    AgenticStatus, EvaluationResult, HistoryEntry, OracleConsultation, PipelineState, StructuredReview,
    ToolCallRecord, ToolResultRecord, WorkflowStatus,
};

/// Declares how a field is folded into state: appended to an existing list,
/// or replaced wholesale. Kept alongside [`StateUpdate::merge_into`] as
/// documentation of the per-field contract; `merge_into` applies each
/// field's reducer directly since the field types differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldReducer {
    Append,
    Replace,
}

/// A sparse set of `PipelineState` field updates returned by a node.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub history: Vec<HistoryEntry>,
    pub pending_user_input: Option<bool>,
    pub user_message: Option<String>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub tool_results: Vec<ToolResultRecord>,
    pub agentic_status: Option<AgenticStatus>,
    pub driver_session_id: Option<String>,
    pub final_response: Option<String>,
    pub error: Option<String>,
    pub design: Option<String>,
    pub plan_markdown: Option<String>,
    pub plan_path: Option<String>,
    pub plan_revision_count: Option<u32>,
    pub plan_validation_issues: Option<Vec<String>>,
    pub review_iteration: Option<u32>,
    pub total_tasks: Option<u32>,
    pub current_task_index: Option<u32>,
    pub task_review_iteration: Option<u32>,
    pub structured_review: Option<StructuredReview>,
    pub evaluation_result: Option<EvaluationResult>,
    pub approved_items: Vec<String>,
    pub auto_approve: Option<bool>,
    pub review_pass: Option<u32>,
    pub workflow_status: Option<WorkflowStatus>,
    pub oracle_consultations: Vec<OracleConsultation>,
    pub interrupt_reason: Option<String>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared reducer for each field name, for introspection/logging.
    /// List fields reducer to [`FieldReducer::Append`]; every scalar field
    /// reducers to [`FieldReducer::Replace`].
    pub fn reducer_for(field: &str) -> Option<FieldReducer> {
        const APPEND_FIELDS: &[&str] =
            &["history", "tool_calls", "tool_results", "approved_items", "oracle_consultations"];
        const REPLACE_FIELDS: &[&str] = &[
            "pending_user_input",
            "user_message",
            "agentic_status",
            "driver_session_id",
            "final_response",
            "error",
            "design",
            "plan_markdown",
            "plan_path",
            "plan_revision_count",
            "plan_validation_issues",
            "review_iteration",
            "total_tasks",
            "current_task_index",
            "task_review_iteration",
            "structured_review",
            "evaluation_result",
            "auto_approve",
            "review_pass",
            "workflow_status",
            "interrupt_reason",
        ];
        if APPEND_FIELDS.contains(&field) {
            Some(FieldReducer::Append)
        } else if REPLACE_FIELDS.contains(&field) {
            Some(FieldReducer::Replace)
        } else {
            None
        }
    }

    /// Applies this update's reducers onto `state` in place.
    pub fn merge_into(self, state: &mut PipelineState) {
        state.history.extend(self.history);
        state.tool_calls.extend(self.tool_calls);
        state.tool_results.extend(self.tool_results);
        state.approved_items.extend(self.approved_items);
        state.oracle_consultations.extend(self.oracle_consultations);

        if let Some(v) = self.pending_user_input {
            state.pending_user_input = v;
        }
        if self.user_message.is_some() {
            state.user_message = self.user_message;
        }
        if let Some(v) = self.agentic_status {
            state.agentic_status = v;
        }
        if self.driver_session_id.is_some() {
            state.driver_session_id = self.driver_session_id;
        }
        if self.final_response.is_some() {
            state.final_response = self.final_response;
        }
        if self.error.is_some() {
            state.error = self.error;
        }
        if self.design.is_some() {
            state.design = self.design;
        }
        if self.plan_markdown.is_some() {
            state.plan_markdown = self.plan_markdown;
        }
        if self.plan_path.is_some() {
            state.plan_path = self.plan_path;
        }
        if let Some(v) = self.plan_revision_count {
            state.plan_revision_count = v;
        }
        if self.plan_validation_issues.is_some() {
            state.plan_validation_issues = self.plan_validation_issues;
        }
        if let Some(v) = self.review_iteration {
            state.review_iteration = v;
        }
        if self.total_tasks.is_some() {
            state.total_tasks = self.total_tasks;
        }
        if let Some(v) = self.current_task_index {
            state.current_task_index = v;
        }
        if let Some(v) = self.task_review_iteration {
            state.task_review_iteration = v;
        }
        if self.structured_review.is_some() {
            state.structured_review = self.structured_review;
        }
        if self.evaluation_result.is_some() {
            state.evaluation_result = self.evaluation_result;
        }
        if let Some(v) = self.auto_approve {
            state.auto_approve = v;
        }
        if let Some(v) = self.review_pass {
            state.review_pass = v;
        }
        if let Some(v) = self.workflow_status {
            state.workflow_status = v;
        }
        if self.interrupt_reason.is_some() {
            state.interrupt_reason = self.interrupt_reason;
        }
    }
}
