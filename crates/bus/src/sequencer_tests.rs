// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use amelia_core::{EventType, FakeClock};
use amelia_store::InMemoryStore;
use futures::StreamExt;
use std::sync::Arc;

fn sequencer() -> Sequencer<FakeClock> {
    Sequencer::new(Arc::new(InMemoryStore::new()), FakeClock::new())
}

#[tokio::test]
async fn sequential_emits_are_gap_free() {
    let seq = sequencer();
    let workflow_id = WorkflowId::new();
    for i in 1..=5 {
        let event = seq
            .emit(workflow_id, EventType::StageStarted, "stage", serde_json::json!({}), EventLevel::Info, None)
            .await
            .unwrap();
        assert_eq!(event.sequence, i);
    }
}

#[tokio::test]
async fn concurrent_emits_for_the_same_workflow_never_collide() {
    let seq = Arc::new(sequencer());
    let workflow_id = WorkflowId::new();
    let mut handles = Vec::new();
    for _ in 0..20 {
        let seq = seq.clone();
        handles.push(tokio::spawn(async move {
            seq.emit(workflow_id, EventType::ToolCall, "tool", serde_json::json!({}), EventLevel::Info, None).await.unwrap()
        }));
    }
    let mut sequences: Vec<u64> = futures::future::join_all(handles).await.into_iter().map(|r| r.unwrap().sequence).collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn subscribers_see_only_their_workflows_events() {
    let seq = sequencer();
    let workflow_a = WorkflowId::new();
    let workflow_b = WorkflowId::new();
    let mut stream = seq.subscribe(EventFilter::for_workflow(workflow_a));

    seq.emit(workflow_b, EventType::WorkflowStarted, "b", serde_json::json!({}), EventLevel::Info, None).await.unwrap();
    seq.emit(workflow_a, EventType::WorkflowStarted, "a", serde_json::json!({}), EventLevel::Info, None).await.unwrap();

    let received = tokio::time::timeout(std::time::Duration::from_millis(200), stream.next()).await.unwrap().unwrap();
    assert_eq!(received.workflow_id, workflow_a);
}

struct AlwaysFailsOnSave;

#[async_trait::async_trait]
impl StateStore for AlwaysFailsOnSave {
    async fn create_workflow(&self, w: amelia_core::Workflow) -> Result<amelia_core::Workflow, amelia_store::StoreError> {
        Ok(w)
    }
    async fn get_workflow(&self, id: WorkflowId) -> Result<amelia_core::Workflow, amelia_store::StoreError> {
        Err(amelia_store::StoreError::WorkflowNotFound(id))
    }
    async fn update_workflow(&self, w: amelia_core::Workflow) -> Result<amelia_core::Workflow, amelia_store::StoreError> {
        Ok(w)
    }
    async fn set_workflow_status(
        &self,
        id: WorkflowId,
        _status: amelia_core::WorkflowStatus,
        _failure_reason: Option<String>,
        _now_ms: u64,
    ) -> Result<amelia_core::Workflow, amelia_store::StoreError> {
        Err(amelia_store::StoreError::WorkflowNotFound(id))
    }
    async fn list_workflows(
        &self,
        _filter: amelia_store::WorkflowFilter,
    ) -> Result<Vec<amelia_core::Workflow>, amelia_store::StoreError> {
        Ok(vec![])
    }
    async fn list_active_workflows(&self) -> Result<Vec<amelia_core::Workflow>, amelia_store::StoreError> {
        Ok(vec![])
    }
    async fn save_event(&self, _event: Event) -> Result<Event, amelia_store::StoreError> {
        Err(amelia_store::StoreError::SequenceConflict { expected: 0, got: 0 })
    }
    async fn get_max_event_sequence(&self, _workflow_id: WorkflowId) -> Result<u64, amelia_store::StoreError> {
        Ok(0)
    }
    async fn list_events(&self, _workflow_id: WorkflowId, _from: Option<u64>) -> Result<Vec<Event>, amelia_store::StoreError> {
        Ok(vec![])
    }
    async fn save_token_usage(
        &self,
        usage: amelia_core::TokenUsage,
    ) -> Result<amelia_core::TokenUsage, amelia_store::StoreError> {
        Ok(usage)
    }
    async fn list_token_usage_by_workflow(
        &self,
        _workflow_id: WorkflowId,
    ) -> Result<Vec<amelia_core::TokenUsage>, amelia_store::StoreError> {
        Ok(vec![])
    }
    async fn aggregate_token_usage(&self, _workflow_id: WorkflowId) -> Result<amelia_core::UsageTotals, amelia_store::StoreError> {
        Ok(amelia_core::UsageTotals::default())
    }
    async fn get_profile(&self, id: amelia_core::ProfileId) -> Result<amelia_core::Profile, amelia_store::StoreError> {
        Err(amelia_store::StoreError::ProfileNotFound(id.to_string()))
    }
    async fn list_profiles(&self) -> Result<Vec<amelia_core::Profile>, amelia_store::StoreError> {
        Ok(vec![])
    }
    async fn get_active_profile(&self) -> Result<amelia_core::Profile, amelia_store::StoreError> {
        Err(amelia_store::StoreError::NoActiveProfile)
    }
    async fn set_active_profile(&self, id: amelia_core::ProfileId) -> Result<amelia_core::Profile, amelia_store::StoreError> {
        Err(amelia_store::StoreError::ProfileNotFound(id.to_string()))
    }
    async fn create_profile(&self, profile: amelia_core::Profile) -> Result<amelia_core::Profile, amelia_store::StoreError> {
        Ok(profile)
    }
    async fn update_profile(&self, profile: amelia_core::Profile) -> Result<amelia_core::Profile, amelia_store::StoreError> {
        Ok(profile)
    }
    async fn delete_profile(&self, _id: amelia_core::ProfileId) -> Result<(), amelia_store::StoreError> {
        Ok(())
    }
    async fn get_settings(&self) -> Result<amelia_core::ServerSettings, amelia_store::StoreError> {
        Ok(amelia_core::ServerSettings::default())
    }
    async fn update_settings(
        &self,
        settings: amelia_core::ServerSettings,
    ) -> Result<amelia_core::ServerSettings, amelia_store::StoreError> {
        Ok(settings)
    }
}

#[tokio::test]
async fn failed_persistence_returns_an_error_and_is_not_fanned_out() {
    let seq = Sequencer::new(Arc::new(AlwaysFailsOnSave), FakeClock::new());
    let workflow_id = WorkflowId::new();
    let mut stream = seq.subscribe(EventFilter::for_workflow(workflow_id));

    let result = seq.emit(workflow_id, EventType::WorkflowStarted, "x", serde_json::json!({}), EventLevel::Info, None).await;
    assert!(result.is_err());

    let nothing = tokio::time::timeout(std::time::Duration::from_millis(50), stream.next()).await;
    assert!(nothing.is_err(), "no event should have been fanned out after a persistence failure");
}
