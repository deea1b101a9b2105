// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::profile::ProfileId;

fn new_workflow() -> Workflow {
    Workflow::new("ISSUE-1", PathBuf::from("/repo/wt-a"), ProfileId::new(), WorkflowType::Full, 1_000)
}

#[test]
fn starts_pending() {
    let wf = new_workflow();
    assert_eq!(wf.status, WorkflowStatus::Pending);
    assert!(wf.started_at_ms.is_none());
}

#[test]
fn pending_to_in_progress_stamps_started_at() {
    let mut wf = new_workflow();
    wf.set_status(WorkflowStatus::InProgress, 2_000).unwrap();
    assert_eq!(wf.status, WorkflowStatus::InProgress);
    assert_eq!(wf.started_at_ms, Some(2_000));
}

#[test]
fn full_approval_cycle() {
    let mut wf = new_workflow();
    wf.set_status(WorkflowStatus::InProgress, 10).unwrap();
    wf.set_status(WorkflowStatus::Blocked, 20).unwrap();
    wf.set_status(WorkflowStatus::InProgress, 30).unwrap();
    wf.set_status(WorkflowStatus::Completed, 40).unwrap();
    assert_eq!(wf.status, WorkflowStatus::Completed);
    assert_eq!(wf.completed_at_ms, Some(40));
}

#[test]
fn pending_can_cancel_directly() {
    let mut wf = new_workflow();
    wf.set_status(WorkflowStatus::Cancelled, 5).unwrap();
    assert_eq!(wf.status, WorkflowStatus::Cancelled);
}

#[test]
fn completed_is_terminal_and_rejects_further_transitions() {
    let mut wf = new_workflow();
    wf.set_status(WorkflowStatus::InProgress, 10).unwrap();
    wf.set_status(WorkflowStatus::Completed, 20).unwrap();
    let err = wf.set_status(WorkflowStatus::InProgress, 30).unwrap_err();
    assert_eq!(err.from, WorkflowStatus::Completed);
    assert_eq!(err.to, WorkflowStatus::InProgress);
}

#[test]
fn pending_cannot_jump_to_blocked() {
    let mut wf = new_workflow();
    assert!(wf.set_status(WorkflowStatus::Blocked, 10).is_err());
}

#[test]
fn holds_worktree_slot_matches_spec_set() {
    assert!(WorkflowStatus::Pending.holds_worktree_slot());
    assert!(WorkflowStatus::InProgress.holds_worktree_slot());
    assert!(WorkflowStatus::Blocked.holds_worktree_slot());
    assert!(!WorkflowStatus::Completed.holds_worktree_slot());
    assert!(!WorkflowStatus::Failed.holds_worktree_slot());
    assert!(!WorkflowStatus::Cancelled.holds_worktree_slot());
}
