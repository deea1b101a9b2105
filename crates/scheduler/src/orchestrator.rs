// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestrator scheduler: admits, runs, pauses, resumes,
//! cancels and reaps workflows, translating the pipeline graph's chunk
//! stream into sequenced events.

use crate::active::ActiveTasks;
use crate::config::SchedulerConfig;
use crate::driver_factory::DriverFactory;
use crate::error::{classify_graph_error, SchedulerError};
use amelia_core::{
    Checkpoint, Clock, EventLevel, EventType, FailureClass, PipelineState, PipelineType, ProfileId, Workflow,
    WorkflowId, WorkflowStatus,
};
use amelia_graph::{GraphChunk, InterruptPayload, NodeContext};
use amelia_store::{CheckpointStore, StateStore};
use futures::StreamExt;
use std::sync::Arc;

/// The single graph checkpoint thread every workflow runs on. The pipeline
/// graph has exactly one cursor per workflow, so there is no need for the
/// richer multi-thread addressing a general checkpoint saver would support.
const THREAD_ID: &str = "main";

/// Branch a sandboxed workflow's worktree is carved off of. Neither
/// `Workflow` nor `Profile` carries a dedicated base-branch field, so every
/// profile is assumed to work off its repository's `main`.
const DEFAULT_BASE_BRANCH: &str = "main";

/// Outcome of one attempt at running (or resuming) a workflow to either
/// completion, a blocking interrupt, or a failure.
enum Attempt {
    Completed,
    Blocked,
    Failed(FailureClass),
}

pub struct Orchestrator<C: Clock + 'static> {
    store: Arc<dyn StateStore>,
    checkpoints: Arc<dyn CheckpointStore>,
    bus: Arc<amelia_bus::Sequencer<C>>,
    driver_factory: Arc<dyn DriverFactory>,
    clock: C,
    config: SchedulerConfig,
    active: ActiveTasks,
    start_lock: tokio::sync::Mutex<()>,
}

impl<C: Clock + 'static> Orchestrator<C> {
    pub fn new(
        store: Arc<dyn StateStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        bus: Arc<amelia_bus::Sequencer<C>>,
        driver_factory: Arc<dyn DriverFactory>,
        clock: C,
        config: SchedulerConfig,
    ) -> Self {
        Self { store, checkpoints, bus, driver_factory, clock, config, active: ActiveTasks::new(), start_lock: tokio::sync::Mutex::new(()) }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Marks workflows that still hold a worktree slot but have no
    /// corresponding in-process task terminal.
    /// A `pending` orphan never actually ran, so it is cancelled rather
    /// than failed — nothing it could be blamed for executing.
    pub async fn recover_orphans(&self) -> Result<(), SchedulerError> {
        for workflow in self.store.list_active_workflows().await? {
            if self.active.holder_of(&workflow.worktree_path).is_some() {
                continue;
            }
            let (status, reason) = if workflow.status == WorkflowStatus::Pending {
                (WorkflowStatus::Cancelled, "server restart")
            } else {
                (WorkflowStatus::Failed, "server restart")
            };
            self.store.set_workflow_status(workflow.id, status, Some(reason.to_string()), self.clock.epoch_ms()).await?;
        }
        Ok(())
    }

    /// Admits a pending workflow: enforces per-worktree exclusion and the
    /// concurrency cap atomically under `start_lock`, then spawns its task.
    pub async fn start_workflow(self: &Arc<Self>, workflow_id: WorkflowId) -> Result<(), SchedulerError> {
        let _admission = self.start_lock.lock().await;

        let workflow = self.store.get_workflow(workflow_id).await?;
        if workflow.status != WorkflowStatus::Pending {
            return Err(SchedulerError::InvalidState(workflow_id));
        }
        if let Some(existing) = self.active.holder_of(&workflow.worktree_path) {
            return Err(SchedulerError::Conflict { existing });
        }
        if self.active.len() >= self.config.max_concurrent {
            return Err(SchedulerError::Capacity);
        }

        let worktree = workflow.worktree_path.clone();
        self.active.insert(worktree.clone(), workflow_id, None);

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run_workflow(workflow, false).await });
        self.active.set_task(&worktree, handle);
        Ok(())
    }

    /// Resumes a `blocked` workflow from its last checkpoint. The worktree
    /// slot was never released while blocked, so no admission check is
    /// needed here.
    pub async fn approve_workflow(self: &Arc<Self>, workflow_id: WorkflowId) -> Result<(), SchedulerError> {
        let workflow = self.store.get_workflow(workflow_id).await?;
        if workflow.status != WorkflowStatus::Blocked {
            return Err(SchedulerError::InvalidState(workflow_id));
        }

        self.bus
            .emit(workflow_id, EventType::ApprovalGranted, "approval granted", serde_json::json!({}), EventLevel::Info, None)
            .await?;

        let worktree = workflow.worktree_path.clone();
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run_workflow(workflow, true).await });
        self.active.set_task(&worktree, handle);
        Ok(())
    }

    /// Rejects a `blocked` workflow: it never resumes, and is marked
    /// `failed` with the rejection recorded as its failure reason.
    pub async fn reject_workflow(self: &Arc<Self>, workflow_id: WorkflowId) -> Result<(), SchedulerError> {
        let workflow = self.store.get_workflow(workflow_id).await?;
        if workflow.status != WorkflowStatus::Blocked {
            return Err(SchedulerError::InvalidState(workflow_id));
        }

        self.active.remove(&workflow.worktree_path);
        self.store.set_workflow_status(workflow_id, WorkflowStatus::Failed, Some("rejected".to_string()), self.clock.epoch_ms()).await?;
        self.bus
            .emit(workflow_id, EventType::ApprovalRejected, "approval rejected", serde_json::json!({}), EventLevel::Warning, None)
            .await?;
        self.checkpoints.delete_checkpoints_for_workflow(workflow_id).await?;
        self.cleanup_worktree(workflow_id, workflow.profile_id).await?;
        Ok(())
    }

    /// Cancels the underlying task and transitions the workflow to
    /// `cancelled`, waiting at most `shutdown_grace` for the task to exit.
    pub async fn cancel_workflow(self: &Arc<Self>, workflow_id: WorkflowId) -> Result<(), SchedulerError> {
        let worktree = self.active.worktree_of(workflow_id).ok_or(SchedulerError::InvalidState(workflow_id))?;
        let workflow = self.store.get_workflow(workflow_id).await?;

        if let Some(entry) = self.active.remove(&worktree) {
            if let Some(handle) = entry.task {
                handle.abort();
                let _ = tokio::time::timeout(self.config.shutdown_grace, handle).await;
            }
        }

        self.store.set_workflow_status(workflow_id, WorkflowStatus::Cancelled, Some("cancelled".to_string()), self.clock.epoch_ms()).await?;
        self.bus
            .emit(workflow_id, EventType::WorkflowCancelled, "workflow cancelled", serde_json::json!({}), EventLevel::Info, None)
            .await?;
        self.checkpoints.delete_checkpoints_for_workflow(workflow_id).await?;
        self.cleanup_worktree(workflow_id, workflow.profile_id).await?;
        Ok(())
    }

    /// Aborts every active task with a bounded wait, then reaps them.
    pub async fn shutdown(&self) {
        let handles = self.active.drain_handles();
        for handle in &handles {
            handle.abort();
        }
        for handle in handles {
            let _ = tokio::time::timeout(self.config.shutdown_grace, handle).await;
        }
    }

    async fn run_workflow(self: Arc<Self>, workflow: Workflow, resume: bool) {
        let workflow_id = workflow.id;
        let worktree = workflow.worktree_path.clone();

        let outcome = self.attempt_with_retries(workflow, resume).await;

        match outcome {
            Ok(Attempt::Completed) => {
                self.active.remove(&worktree);
            }
            Ok(Attempt::Blocked) => {
                // Slot stays registered (blocked still holds it); clear the
                // finished task handle so cancel_workflow doesn't await a
                // handle that has already returned.
                self.active.clear_task(&worktree);
            }
            Ok(Attempt::Failed(_)) => {
                self.active.remove(&worktree);
            }
            Err(scheduler_error) => {
                tracing::error!(%workflow_id, error = %scheduler_error, "workflow run ended in a scheduler-level error");
                self.active.remove(&worktree);
            }
        }
    }

    /// Runs attempts in a loop, retrying transient failures up to
    /// `default_retry_budget` with a linear backoff, emitting
    /// `WORKFLOW_RETRY` per retry.
    async fn attempt_with_retries(&self, workflow: Workflow, resume: bool) -> Result<Attempt, SchedulerError> {
        const RETRY_BUDGET: u32 = 3;
        const BACKOFF_BASE_MS: u64 = 2_000;

        let mut resume = resume;
        for attempt_number in 0..=RETRY_BUDGET {
            match self.attempt_once(&workflow, resume).await? {
                Attempt::Failed(FailureClass::Transient(cause)) if attempt_number < RETRY_BUDGET => {
                    self.bus
                        .emit(
                            workflow.id,
                            EventType::WorkflowRetry,
                            format!("retrying after transient failure: {cause}"),
                            serde_json::json!({"attempt": attempt_number + 1, "cause": cause}),
                            EventLevel::Warning,
                            None,
                        )
                        .await?;
                    tokio::time::sleep(std::time::Duration::from_millis(BACKOFF_BASE_MS * 2u64.pow(attempt_number))).await;
                    // A retried attempt resumes from whatever checkpoint the
                    // failed attempt last reached, if any; absent one it
                    // restarts the workflow from scratch.
                    resume = self.checkpoints.get_checkpoint(workflow.id, THREAD_ID).await?.is_some();
                    continue;
                }
                Attempt::Failed(class) => {
                    self.finalize_failure(&workflow, class).await?;
                    return Ok(Attempt::Failed(FailureClass::Fatal("exhausted".to_string())));
                }
                other => return Ok(other),
            }
        }
        unreachable!("loop always returns within its RETRY_BUDGET + 1 iterations")
    }

    async fn attempt_once(&self, workflow: &Workflow, resume: bool) -> Result<Attempt, SchedulerError> {
        let now = self.clock.epoch_ms();
        self.store.set_workflow_status(workflow.id, WorkflowStatus::InProgress, None, now).await?;
        if !resume {
            self.bus.emit(workflow.id, EventType::WorkflowStarted, "workflow started", serde_json::json!({}), EventLevel::Info, None).await?;
        }

        let profile = self.store.get_profile(workflow.profile_id).await?;
        let driver = self.driver_factory.build(&profile)?;

        if !resume {
            if let Some(worktree) = self.driver_factory.worktree_manager(&profile) {
                let repo_url = workflow.worktree_path.display().to_string();
                worktree.ensure_repo_cloned(&repo_url).await?;
                worktree.create_worktree(workflow.id, DEFAULT_BASE_BRANCH).await?;
            }
        }

        let (mut state, resume_from) = if resume {
            let checkpoint = self
                .checkpoints
                .get_checkpoint(workflow.id, THREAD_ID)
                .await?
                .ok_or(amelia_store::StoreError::CheckpointNotFound(workflow.id))?;
            let state: PipelineState = serde_json::from_value(checkpoint.state)?;
            (state, checkpoint.next_node)
        } else {
            let mut state = PipelineState::new(workflow.id, profile.id, PipelineType::Implementation, profile.max_review_iterations, profile.max_plan_revisions);
            state.issue = Some(serde_json::json!({"id": workflow.issue_id}));
            (state, None)
        };

        let ctx = NodeContext::new(driver, workflow.worktree_path.clone(), profile, self.clock.clone());
        let graph = Arc::new(amelia_graph::build_implementation_graph::<C>()?);
        let mut stream = graph.invoke_streaming(state.clone(), ctx, resume_from);

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(GraphChunk::Tasks(node)) => {
                    self.bus
                        .emit(workflow.id, EventType::StageStarted, format!("stage started: {node}"), serde_json::json!({"node": node}), EventLevel::Info, None)
                        .await?;
                }
                Ok(GraphChunk::Updates(update)) => {
                    update.merge_into(&mut state);
                    self.bus
                        .emit(workflow.id, EventType::StageCompleted, "stage completed", serde_json::json!({}), EventLevel::Info, None)
                        .await?;
                }
                Ok(GraphChunk::Interrupt(payload)) => {
                    self.handle_interrupt(workflow, &state, &payload).await?;
                    return Ok(Attempt::Blocked);
                }
                Err(graph_error) => {
                    let class = classify_graph_error(&graph_error);
                    return Ok(Attempt::Failed(class));
                }
            }
        }

        self.store.set_workflow_status(workflow.id, WorkflowStatus::Completed, None, self.clock.epoch_ms()).await?;
        self.bus.emit(workflow.id, EventType::WorkflowCompleted, "workflow completed", serde_json::json!({}), EventLevel::Info, None).await?;
        self.checkpoints.delete_checkpoints_for_workflow(workflow.id).await?;
        if let Some(worktree) = self.driver_factory.worktree_manager(&profile) {
            worktree.remove_worktree(workflow.id).await;
        }
        Ok(Attempt::Completed)
    }

    /// Best-effort worktree teardown for a terminal workflow outside
    /// `attempt_once`'s own completion path (rejection, cancellation,
    /// retry exhaustion) — these only have a `workflow_id`/`profile_id`,
    /// not the already-resolved `Profile` `attempt_once` holds.
    async fn cleanup_worktree(&self, workflow_id: WorkflowId, profile_id: ProfileId) -> Result<(), SchedulerError> {
        let profile = self.store.get_profile(profile_id).await?;
        if let Some(worktree) = self.driver_factory.worktree_manager(&profile) {
            worktree.remove_worktree(workflow_id).await;
        }
        Ok(())
    }

    async fn handle_interrupt(&self, workflow: &Workflow, state: &PipelineState, payload: &InterruptPayload) -> Result<(), SchedulerError> {
        let node = &payload.node;
        let mut workflow = workflow.clone();
        workflow.plan_cache = state.plan_markdown.clone();
        workflow.issue_cache = state.issue.clone();
        self.store.update_workflow(workflow.clone()).await?;
        self.store.set_workflow_status(workflow.id, WorkflowStatus::Blocked, None, self.clock.epoch_ms()).await?;

        let checkpoint = Checkpoint::new(workflow.id, THREAD_ID, Some(node.clone()), serde_json::to_value(state)?, self.clock.epoch_ms());
        self.checkpoints.put_checkpoint(checkpoint).await?;

        let (level, message) = match &payload.reason {
            Some(reason) => (EventLevel::Warning, format!("approval required before {node}: {reason}")),
            None => (EventLevel::Info, format!("approval required before {node}")),
        };
        self.bus
            .emit(workflow.id, EventType::ApprovalRequired, message, serde_json::json!({"node": node, "reason": payload.reason}), level, None)
            .await?;
        Ok(())
    }

    async fn finalize_failure(&self, workflow: &Workflow, class: FailureClass) -> Result<(), SchedulerError> {
        let reason = class.reason_string();
        self.store.set_workflow_status(workflow.id, WorkflowStatus::Failed, Some(reason.clone()), self.clock.epoch_ms()).await?;
        self.bus
            .emit(workflow.id, EventType::WorkflowFailed, reason, serde_json::json!({}), EventLevel::Error, None)
            .await?;
        self.checkpoints.delete_checkpoints_for_workflow(workflow.id).await?;
        self.cleanup_worktree(workflow.id, workflow.profile_id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
