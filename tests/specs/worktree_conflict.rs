//! Scenario 2: two workflows admitted against the same worktree path. The
//! first admission wins the exclusion slot; the second is rejected with the
//! id of whichever workflow is already holding it.

use crate::support::*;
use amelia_driver::{Driver, FakeDriver};
use amelia_scheduler::{SchedulerConfig, SchedulerError};
use std::sync::Arc;

#[tokio::test]
async fn second_start_on_the_same_worktree_is_rejected_with_the_existing_holder() {
    let driver: Arc<dyn Driver> = Arc::new(FakeDriver::new(vec![]));
    let h = harness(SchedulerConfig::default(), driver).await;

    let worktree = std::env::temp_dir().join("wt-conflict");
    let first = new_workflow(&h, "ISSUE-1", worktree.clone()).await;
    let second = new_workflow(&h, "ISSUE-2", worktree.clone()).await;

    h.orchestrator.start_workflow(first.id).await.unwrap();

    let result = h.orchestrator.start_workflow(second.id).await;
    match result {
        Err(SchedulerError::Conflict { existing }) => assert_eq!(existing, first.id),
        other => panic!("expected a worktree conflict, got {other:?}"),
    }
}
