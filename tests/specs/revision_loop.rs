//! Scenario 3: a plan that never validates forces `plan_validator` through
//! `revise` until `max_plan_revisions` is exhausted, then `escalate`s to
//! human approval instead of looping forever.

use crate::support::*;
use amelia_core::WorkflowStatus;
use amelia_driver::{AgenticMessage, Driver};
use amelia_scheduler::SchedulerConfig;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays the same invalid plan for every architect call; the test's
/// profile caps `max_plan_revisions` at 2, so the third architect call is
/// the one that exhausts the revision budget.
struct AlwaysInvalidPlanDriver {
    calls: Mutex<VecDeque<()>>,
}

impl AlwaysInvalidPlanDriver {
    fn new(expected_calls: usize) -> Self {
        Self { calls: Mutex::new((0..expected_calls).map(|_| ()).collect()) }
    }
}

#[async_trait::async_trait]
impl Driver for AlwaysInvalidPlanDriver {
    async fn generate(
        &self,
        _request: amelia_driver::GenerateRequest<'_>,
    ) -> Result<amelia_driver::GenerateResult, amelia_driver::DriverError> {
        Err(amelia_driver::DriverError::NotImplemented("generate is not used here".to_string()))
    }

    async fn execute_agentic(
        &self,
        _request: amelia_driver::AgenticRequest<'_>,
    ) -> Result<futures::stream::BoxStream<'static, Result<AgenticMessage, amelia_driver::DriverError>>, amelia_driver::DriverError>
    {
        self.calls.lock().unwrap().pop_front().expect("architect called more times than the revision budget allows");
        let content = architect_json(INVALID_PLAN, "invalid");
        Ok(Box::pin(futures::stream::iter(vec![Ok(AgenticMessage::Result { content })])))
    }

    async fn cleanup_session(&self, _session_id: &str) -> bool {
        true
    }

    fn get_usage(&self) -> Option<amelia_driver::DriverUsage> {
        None
    }
}

#[tokio::test]
async fn an_invalid_plan_escalates_to_human_approval_after_the_revision_budget_is_exhausted() {
    // profile.max_plan_revisions = 2: architect is called once for the
    // initial plan, then once per revise (2 more), then escalate fires.
    let driver: Arc<dyn Driver> = Arc::new(AlwaysInvalidPlanDriver::new(3));
    let h = harness(SchedulerConfig::default(), driver).await;
    let workflow = new_workflow(&h, "ISSUE-1", std::env::temp_dir().join("wt-revision")).await;

    h.orchestrator.start_workflow(workflow.id).await.unwrap();
    let blocked = wait_for_status(&h.store, workflow.id, WorkflowStatus::Blocked, 50).await;
    assert_eq!(blocked, WorkflowStatus::Blocked);

    let events = h.store.list_events(workflow.id, None).await.unwrap();
    let stage_starts: Vec<_> = events
        .iter()
        .filter(|e| e.event_type.as_wire_str() == "stage_started" && e.data.get("node").and_then(|v| v.as_str()) == Some("architect"))
        .collect();
    assert_eq!(stage_starts.len(), 3, "architect should run once plus one more per revision");

    let last = events.last().unwrap();
    assert_eq!(last.event_type.as_wire_str(), "approval_required");
    assert!(last.message.contains("human_approval"));
    assert_eq!(last.level.to_string(), "warning");
    assert_eq!(last.data.get("reason").and_then(|v| v.as_str()), Some("plan_revision_budget_exhausted"));
}
