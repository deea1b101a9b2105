// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable persistence contract.

use crate::error::StoreError;
use amelia_core::{
    Checkpoint, Event, Profile, ProfileId, ServerSettings, TokenUsage, UsageTotals, Workflow, WorkflowId, WorkflowStatus,
};
use async_trait::async_trait;

/// Filter applied by `list_workflows` (`GET /workflows?status=&worktree=`).
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    pub status: Option<WorkflowStatus>,
    pub worktree_path: Option<std::path::PathBuf>,
}

/// Durable state behind the orchestrator: workflows, the event log, token
/// usage, profiles, and server settings.
///
/// Checkpoint storage is a separate trait ([`CheckpointStore`]); it may be
/// provided by a separate library, though today `amelia-graph` implements
/// it against the same pool this trait's implementors expose.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Creates a workflow in `pending` status. Atomically enforces the
    /// per-worktree exclusion invariant: fails with
    /// [`StoreError::WorktreeConflict`] if another workflow with status in
    /// {pending, in_progress, blocked} already holds `worktree_path`.
    async fn create_workflow(&self, workflow: Workflow) -> Result<Workflow, StoreError>;

    async fn get_workflow(&self, id: WorkflowId) -> Result<Workflow, StoreError>;

    /// Replaces the stored workflow record in full (used after a node updates
    /// `plan_cache`/`issue_cache` while blocked).
    async fn update_workflow(&self, workflow: Workflow) -> Result<Workflow, StoreError>;

    /// Transitions `workflow_id` to `status`, validating against
    /// [`amelia_core::WorkflowStatus::can_transition_to`].
    async fn set_workflow_status(
        &self,
        workflow_id: WorkflowId,
        status: WorkflowStatus,
        failure_reason: Option<String>,
        now_ms: u64,
    ) -> Result<Workflow, StoreError>;

    async fn list_workflows(&self, filter: WorkflowFilter) -> Result<Vec<Workflow>, StoreError>;

    /// Workflows whose status still holds the worktree exclusion slot
    /// (pending, in_progress, blocked) — used for orphan cleanup at startup.
    async fn list_active_workflows(&self) -> Result<Vec<Workflow>, StoreError>;

    /// Appends an event. Fails with [`StoreError::SequenceConflict`] if
    /// `event.sequence != 1 + get_max_event_sequence(event.workflow_id)`.
    async fn save_event(&self, event: Event) -> Result<Event, StoreError>;

    /// `0` if the workflow has no events yet, so the next sequence is `1`.
    async fn get_max_event_sequence(&self, workflow_id: WorkflowId) -> Result<u64, StoreError>;

    async fn list_events(&self, workflow_id: WorkflowId, from_sequence: Option<u64>) -> Result<Vec<Event>, StoreError>;

    async fn save_token_usage(&self, usage: TokenUsage) -> Result<TokenUsage, StoreError>;

    async fn list_token_usage_by_workflow(&self, workflow_id: WorkflowId) -> Result<Vec<TokenUsage>, StoreError>;

    async fn aggregate_token_usage(&self, workflow_id: WorkflowId) -> Result<UsageTotals, StoreError>;

    async fn get_profile(&self, id: ProfileId) -> Result<Profile, StoreError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    async fn get_active_profile(&self) -> Result<Profile, StoreError>;

    /// Deactivates every other profile and activates `id` (partial unique
    /// index on active-profile).
    async fn set_active_profile(&self, id: ProfileId) -> Result<Profile, StoreError>;

    async fn create_profile(&self, profile: Profile) -> Result<Profile, StoreError>;

    async fn update_profile(&self, profile: Profile) -> Result<Profile, StoreError>;

    async fn delete_profile(&self, id: ProfileId) -> Result<(), StoreError>;

    async fn get_settings(&self) -> Result<ServerSettings, StoreError>;

    async fn update_settings(&self, settings: ServerSettings) -> Result<ServerSettings, StoreError>;
}

/// Opaque checkpoint storage.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn put_checkpoint(&self, checkpoint: Checkpoint) -> Result<(), StoreError>;

    /// The most recent checkpoint for `(workflow_id, thread_id)`, if any.
    async fn get_checkpoint(&self, workflow_id: WorkflowId, thread_id: &str) -> Result<Option<Checkpoint>, StoreError>;

    async fn delete_checkpoints_for_workflow(&self, workflow_id: WorkflowId) -> Result<(), StoreError>;
}
