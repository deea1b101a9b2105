// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory [`StateStore`]/[`CheckpointStore`], backing unit and
//! property-based tests without a database. `parking_lot::RwLock`-guarded
//! maps throughout, same as the persistent store's in-process caches.

use crate::error::StoreError;
use crate::traits::{CheckpointStore, StateStore, WorkflowFilter};
use amelia_core::{
    Checkpoint, Event, Profile, ProfileId, ServerSettings, TokenUsage, UsageTotals, Workflow, WorkflowId, WorkflowStatus,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryStore {
    workflows: RwLock<HashMap<WorkflowId, Workflow>>,
    events: RwLock<HashMap<WorkflowId, Vec<Event>>>,
    token_usage: RwLock<HashMap<WorkflowId, Vec<TokenUsage>>>,
    profiles: RwLock<HashMap<ProfileId, Profile>>,
    active_profile: RwLock<Option<ProfileId>>,
    settings: RwLock<ServerSettings>,
    checkpoints: RwLock<HashMap<(WorkflowId, String), Vec<Checkpoint>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn create_workflow(&self, workflow: Workflow) -> Result<Workflow, StoreError> {
        let mut workflows = self.workflows.write();
        if let Some(existing) = workflows
            .values()
            .find(|w| w.worktree_path == workflow.worktree_path && w.status.holds_worktree_slot())
        {
            return Err(StoreError::WorktreeConflict { existing: existing.id });
        }
        workflows.insert(workflow.id, workflow.clone());
        Ok(workflow)
    }

    async fn get_workflow(&self, id: WorkflowId) -> Result<Workflow, StoreError> {
        self.workflows.read().get(&id).cloned().ok_or(StoreError::WorkflowNotFound(id))
    }

    async fn update_workflow(&self, workflow: Workflow) -> Result<Workflow, StoreError> {
        let mut workflows = self.workflows.write();
        if !workflows.contains_key(&workflow.id) {
            return Err(StoreError::WorkflowNotFound(workflow.id));
        }
        workflows.insert(workflow.id, workflow.clone());
        Ok(workflow)
    }

    async fn set_workflow_status(
        &self,
        workflow_id: WorkflowId,
        status: WorkflowStatus,
        failure_reason: Option<String>,
        now_ms: u64,
    ) -> Result<Workflow, StoreError> {
        let mut workflows = self.workflows.write();
        let workflow = workflows.get_mut(&workflow_id).ok_or(StoreError::WorkflowNotFound(workflow_id))?;
        workflow.set_status(status, now_ms)?;
        if failure_reason.is_some() {
            workflow.failure_reason = failure_reason;
        }
        Ok(workflow.clone())
    }

    async fn list_workflows(&self, filter: WorkflowFilter) -> Result<Vec<Workflow>, StoreError> {
        let workflows = self.workflows.read();
        Ok(workflows
            .values()
            .filter(|w| filter.status.map(|s| w.status == s).unwrap_or(true))
            .filter(|w| filter.worktree_path.as_ref().map(|p| &w.worktree_path == p).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn list_active_workflows(&self) -> Result<Vec<Workflow>, StoreError> {
        Ok(self.workflows.read().values().filter(|w| w.status.holds_worktree_slot()).cloned().collect())
    }

    async fn save_event(&self, event: Event) -> Result<Event, StoreError> {
        let mut events = self.events.write();
        let log = events.entry(event.workflow_id).or_default();
        let expected = log.last().map(|e| e.sequence + 1).unwrap_or(1);
        if event.sequence != expected {
            return Err(StoreError::SequenceConflict { expected, got: event.sequence });
        }
        log.push(event.clone());
        Ok(event)
    }

    async fn get_max_event_sequence(&self, workflow_id: WorkflowId) -> Result<u64, StoreError> {
        Ok(self.events.read().get(&workflow_id).and_then(|log| log.last()).map(|e| e.sequence).unwrap_or(0))
    }

    async fn list_events(&self, workflow_id: WorkflowId, from_sequence: Option<u64>) -> Result<Vec<Event>, StoreError> {
        let from = from_sequence.unwrap_or(0);
        Ok(self
            .events
            .read()
            .get(&workflow_id)
            .map(|log| log.iter().filter(|e| e.sequence > from).cloned().collect())
            .unwrap_or_default())
    }

    async fn save_token_usage(&self, usage: TokenUsage) -> Result<TokenUsage, StoreError> {
        self.token_usage.write().entry(usage.workflow_id).or_default().push(usage.clone());
        Ok(usage)
    }

    async fn list_token_usage_by_workflow(&self, workflow_id: WorkflowId) -> Result<Vec<TokenUsage>, StoreError> {
        Ok(self.token_usage.read().get(&workflow_id).cloned().unwrap_or_default())
    }

    async fn aggregate_token_usage(&self, workflow_id: WorkflowId) -> Result<UsageTotals, StoreError> {
        let mut total = UsageTotals::default();
        for usage in self.token_usage.read().get(&workflow_id).into_iter().flatten() {
            total += UsageTotals {
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
                cache_read_tokens: usage.cache_read_tokens,
                cache_creation_tokens: usage.cache_creation_tokens,
                cost_usd: usage.cost_usd,
                num_turns: usage.num_turns,
            };
        }
        Ok(total)
    }

    async fn get_profile(&self, id: ProfileId) -> Result<Profile, StoreError> {
        self.profiles.read().get(&id).cloned().ok_or_else(|| StoreError::ProfileNotFound(id.to_string()))
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let mut profiles: Vec<Profile> = self.profiles.read().values().cloned().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn get_active_profile(&self) -> Result<Profile, StoreError> {
        let active = self.active_profile.read();
        let id = active.ok_or(StoreError::NoActiveProfile)?;
        self.profiles.read().get(&id).cloned().ok_or(StoreError::NoActiveProfile)
    }

    async fn set_active_profile(&self, id: ProfileId) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write();
        if !profiles.contains_key(&id) {
            return Err(StoreError::ProfileNotFound(id.to_string()));
        }
        for profile in profiles.values_mut() {
            profile.is_active = profile.id == id;
        }
        *self.active_profile.write() = Some(id);
        Ok(profiles.get(&id).cloned().expect("checked above"))
    }

    async fn create_profile(&self, profile: Profile) -> Result<Profile, StoreError> {
        self.profiles.write().insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write();
        if !profiles.contains_key(&profile.id) {
            return Err(StoreError::ProfileNotFound(profile.id.to_string()));
        }
        profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn delete_profile(&self, id: ProfileId) -> Result<(), StoreError> {
        self.profiles.write().remove(&id).ok_or_else(|| StoreError::ProfileNotFound(id.to_string()))?;
        Ok(())
    }

    async fn get_settings(&self) -> Result<ServerSettings, StoreError> {
        Ok(self.settings.read().clone())
    }

    async fn update_settings(&self, settings: ServerSettings) -> Result<ServerSettings, StoreError> {
        *self.settings.write() = settings.clone();
        Ok(settings)
    }
}

#[async_trait]
impl CheckpointStore for InMemoryStore {
    async fn put_checkpoint(&self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        let key = (checkpoint.workflow_id, checkpoint.thread_id.clone());
        self.checkpoints.write().entry(key).or_default().push(checkpoint);
        Ok(())
    }

    async fn get_checkpoint(&self, workflow_id: WorkflowId, thread_id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let key = (workflow_id, thread_id.to_string());
        Ok(self.checkpoints.read().get(&key).and_then(|list| list.last()).cloned())
    }

    async fn delete_checkpoints_for_workflow(&self, workflow_id: WorkflowId) -> Result<(), StoreError> {
        self.checkpoints.write().retain(|(wf, _), _| *wf != workflow_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
