// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow identifier and lifecycle.

use crate::profile::ProfileId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a workflow run.
    pub struct WorkflowId("wfl-");
}

/// Status of a workflow. Transitions are monotonic except for a single
/// `pending -> cancelled` escape hatch and the
/// `in_progress -> blocked -> in_progress -> {completed | failed | cancelled}`
/// cycle around approval pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    InProgress,
    Blocked,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    WorkflowStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Blocked => "blocked",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl WorkflowStatus {
    /// Whether this status holds the worktree's exclusion slot.
    pub fn holds_worktree_slot(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress | Self::Blocked)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether `self -> next` is an allowed lifecycle transition.
    pub fn can_transition_to(&self, next: Self) -> bool {
        use WorkflowStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Cancelled)
                | (InProgress, Blocked)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (InProgress, Cancelled)
                | (Blocked, InProgress)
                | (Blocked, Cancelled)
                | (Blocked, Failed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    Full,
    PlanOnly,
    ReviewOnly,
}

crate::simple_display! {
    WorkflowType {
        Full => "full",
        PlanOnly => "plan-only",
        ReviewOnly => "review-only",
    }
}

/// A single run of a pipeline for one issue/task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub issue_id: String,
    pub worktree_path: PathBuf,
    pub profile_id: ProfileId,
    pub status: WorkflowStatus,
    pub workflow_type: WorkflowType,

    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_at_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Cached plan markdown, synced while `status == blocked` so REST reads
    /// don't need to reach into the graph checkpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_cache: Option<String>,
    /// Cached structured issue view, used by REST while blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_cache: Option<serde_json::Value>,
}

impl Workflow {
    pub fn new(issue_id: impl Into<String>, worktree_path: PathBuf, profile_id: ProfileId, workflow_type: WorkflowType, now_ms: u64) -> Self {
        Self {
            id: WorkflowId::new(),
            issue_id: issue_id.into(),
            worktree_path,
            profile_id,
            status: WorkflowStatus::Pending,
            workflow_type,
            created_at_ms: now_ms,
            started_at_ms: None,
            completed_at_ms: None,
            planned_at_ms: None,
            failure_reason: None,
            plan_cache: None,
            issue_cache: None,
        }
    }

    /// Attempt a status transition, enforcing the lifecycle invariant.
    pub fn set_status(&mut self, next: WorkflowStatus, now_ms: u64) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition { from: self.status, to: next });
        }
        if next == WorkflowStatus::InProgress && self.started_at_ms.is_none() {
            self.started_at_ms = Some(now_ms);
        }
        if next.is_terminal() {
            self.completed_at_ms = Some(now_ms);
        }
        self.status = next;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid workflow transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: WorkflowStatus,
    pub to: WorkflowStatus,
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
