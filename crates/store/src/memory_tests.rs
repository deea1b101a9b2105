// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use amelia_core::{Profile, ProfileId, SandboxConfig, TrackerKind, WorkflowType};
use std::collections::HashMap;
use std::path::PathBuf;

fn test_profile() -> Profile {
    Profile {
        id: ProfileId::new(),
        name: "default".into(),
        tracker: TrackerKind::Noop,
        working_dir_root: PathBuf::from("/repos"),
        plan_output_dir: PathBuf::from("plans"),
        max_review_iterations: 3,
        max_plan_revisions: 2,
        agents: HashMap::new(),
        sandbox: SandboxConfig::none(),
        is_active: false,
    }
}

#[tokio::test]
async fn second_workflow_on_same_worktree_conflicts() {
    let store = InMemoryStore::new();
    let profile_id = ProfileId::new();
    let wt = PathBuf::from("/repos/amelia");
    let first = Workflow::new("issue-1", wt.clone(), profile_id, WorkflowType::Full, 0);
    store.create_workflow(first.clone()).await.unwrap();

    let second = Workflow::new("issue-2", wt, profile_id, WorkflowType::Full, 0);
    let err = store.create_workflow(second).await.unwrap_err();
    assert!(matches!(err, StoreError::WorktreeConflict { existing } if existing == first.id));
}

#[tokio::test]
async fn completed_workflow_frees_the_worktree_slot() {
    let store = InMemoryStore::new();
    let profile_id = ProfileId::new();
    let wt = PathBuf::from("/repos/amelia");
    let first = Workflow::new("issue-1", wt.clone(), profile_id, WorkflowType::Full, 0);
    store.create_workflow(first.clone()).await.unwrap();
    store
        .set_workflow_status(first.id, WorkflowStatus::InProgress, None, 1)
        .await
        .unwrap();
    store
        .set_workflow_status(first.id, WorkflowStatus::Completed, None, 2)
        .await
        .unwrap();

    let second = Workflow::new("issue-2", wt, profile_id, WorkflowType::Full, 3);
    store.create_workflow(second).await.unwrap();
}

#[tokio::test]
async fn events_must_arrive_in_gap_free_sequence() {
    let store = InMemoryStore::new();
    let workflow_id = WorkflowId::new();
    let e1 = Event::builder().workflow_id(workflow_id).sequence(1).build();
    store.save_event(e1).await.unwrap();

    let e3 = Event::builder().workflow_id(workflow_id).sequence(3).build();
    let err = store.save_event(e3).await.unwrap_err();
    assert!(matches!(err, StoreError::SequenceConflict { expected: 2, got: 3 }));
}

#[tokio::test]
async fn max_sequence_resumes_at_the_last_persisted_value() {
    let store = InMemoryStore::new();
    let workflow_id = WorkflowId::new();
    assert_eq!(store.get_max_event_sequence(workflow_id).await.unwrap(), 0);
    store.save_event(Event::builder().workflow_id(workflow_id).sequence(1).build()).await.unwrap();
    store.save_event(Event::builder().workflow_id(workflow_id).sequence(2).build()).await.unwrap();
    assert_eq!(store.get_max_event_sequence(workflow_id).await.unwrap(), 2);
}

#[tokio::test]
async fn set_active_profile_deactivates_the_previous_one() {
    let store = InMemoryStore::new();
    let a = test_profile();
    let mut b = test_profile();
    b.name = "other".into();
    store.create_profile(a.clone()).await.unwrap();
    store.create_profile(b.clone()).await.unwrap();

    store.set_active_profile(a.id).await.unwrap();
    store.set_active_profile(b.id).await.unwrap();

    let a_after = store.get_profile(a.id).await.unwrap();
    let b_after = store.get_profile(b.id).await.unwrap();
    assert!(!a_after.is_active);
    assert!(b_after.is_active);
}

#[tokio::test]
async fn checkpoint_get_returns_the_most_recently_put_value() {
    let store = InMemoryStore::new();
    let workflow_id = WorkflowId::new();
    store
        .put_checkpoint(Checkpoint::new(workflow_id, "main", Some("developer".into()), serde_json::json!({"n": 1}), 0))
        .await
        .unwrap();
    store
        .put_checkpoint(Checkpoint::new(workflow_id, "main", Some("reviewer".into()), serde_json::json!({"n": 2}), 1))
        .await
        .unwrap();

    let latest = store.get_checkpoint(workflow_id, "main").await.unwrap().unwrap();
    assert_eq!(latest.next_node.as_deref(), Some("reviewer"));
}
