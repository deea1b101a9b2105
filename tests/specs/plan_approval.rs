//! Scenario 1: plan -> approve -> implement takes a single-task workflow
//! from `pending` all the way to `completed` through the public admission
//! path (`start_workflow` then `approve_workflow`).

use crate::support::*;
use amelia_core::WorkflowStatus;
use amelia_driver::Driver;
use amelia_scheduler::SchedulerConfig;
use std::sync::Arc;

#[tokio::test]
async fn single_task_workflow_reaches_completed_after_approval() {
    let driver: Arc<dyn Driver> = Arc::new(ScriptedDriver::new(vec![
        architect_json(VALID_ONE_TASK_PLAN, "one task plan"),
        "developer implemented task 1".to_string(),
        reviewer_approved_json(),
    ]));

    let h = harness(SchedulerConfig::default(), driver).await;
    let workflow = new_workflow(&h, "ISSUE-1", std::env::temp_dir().join("wt-plan-approval")).await;

    h.orchestrator.start_workflow(workflow.id).await.unwrap();
    let blocked = wait_for_status(&h.store, workflow.id, WorkflowStatus::Blocked, 50).await;
    assert_eq!(blocked, WorkflowStatus::Blocked);

    let events = h.store.list_events(workflow.id, None).await.unwrap();
    assert!(events.iter().any(|e| e.event_type.as_wire_str() == "approval_required"));

    h.orchestrator.approve_workflow(workflow.id).await.unwrap();
    let completed = wait_for_status(&h.store, workflow.id, WorkflowStatus::Completed, 50).await;
    assert_eq!(completed, WorkflowStatus::Completed);

    let events = h.store.list_events(workflow.id, None).await.unwrap();
    let types: Vec<_> = events.iter().map(|e| e.event_type.as_wire_str()).collect();
    assert_eq!(types.first(), Some(&"workflow_started"));
    assert_eq!(types.last(), Some(&"workflow_completed"));
    assert!(types.contains(&"approval_granted"));
}
