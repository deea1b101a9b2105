//! Scenario 4: cancelling a workflow while its developer node is mid-stream
//! aborts the running task and leaves the workflow `cancelled`, with a
//! trailing `workflow_cancelled` event.

use crate::support::*;
use amelia_core::WorkflowStatus;
use amelia_driver::{AgenticMessage, Driver};
use amelia_scheduler::SchedulerConfig;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays scripted responses until exhausted, then hangs forever on the
/// next `execute_agentic` call — standing in for a developer turn that
/// never finishes streaming.
struct ScriptThenHangDriver {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptThenHangDriver {
    fn new(responses: Vec<String>) -> Self {
        Self { responses: Mutex::new(responses.into_iter().collect()) }
    }
}

#[async_trait::async_trait]
impl Driver for ScriptThenHangDriver {
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
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(content) => Ok(Box::pin(futures::stream::iter(vec![Ok(AgenticMessage::Result { content })]))),
            None => Ok(Box::pin(futures::stream::pending())),
        }
    }

    async fn cleanup_session(&self, _session_id: &str) -> bool {
        true
    }

    fn get_usage(&self) -> Option<amelia_driver::DriverUsage> {
        None
    }
}

#[tokio::test]
async fn cancel_during_a_hanging_developer_turn_marks_the_workflow_cancelled() {
    let driver: Arc<dyn Driver> =
        Arc::new(ScriptThenHangDriver::new(vec![architect_json(VALID_ONE_TASK_PLAN, "one task plan")]));
    let h = harness(SchedulerConfig::default(), driver).await;
    let workflow = new_workflow(&h, "ISSUE-1", std::env::temp_dir().join("wt-cancel")).await;

    h.orchestrator.start_workflow(workflow.id).await.unwrap();
    let blocked = wait_for_status(&h.store, workflow.id, WorkflowStatus::Blocked, 50).await;
    assert_eq!(blocked, WorkflowStatus::Blocked);

    // Resuming into the developer node hangs: the script is now empty, so
    // every subsequent `execute_agentic` call never resolves.
    h.orchestrator.approve_workflow(workflow.id).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(h.store.get_workflow(workflow.id).await.unwrap().status, WorkflowStatus::InProgress);

    h.orchestrator.cancel_workflow(workflow.id).await.unwrap();

    let cancelled = wait_for_status(&h.store, workflow.id, WorkflowStatus::Cancelled, 50).await;
    assert_eq!(cancelled, WorkflowStatus::Cancelled);

    let events = h.store.list_events(workflow.id, None).await.unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.event_type.as_wire_str(), "workflow_cancelled");
    assert_eq!(last.level, amelia_core::EventLevel::Info);
    assert_eq!(last.message, "workflow cancelled");
}
