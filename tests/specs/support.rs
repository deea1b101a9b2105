//! Shared harness for the cross-crate scenarios in `specs.rs`.
//!
//! Wires a real [`amelia_scheduler::Orchestrator`] to an [`InMemoryStore`]
//! and a [`amelia_bus::Sequencer`], the same collaborator graph
//! `amelia-api`'s own router tests and `amelia-scheduler`'s own
//! orchestrator tests use, but exposed here for scenarios that cross crate
//! boundaries instead of exercising one crate in isolation.

use amelia_core::{FakeClock, Profile, ProfileId, SandboxConfig, TrackerKind, Workflow, WorkflowType};
use amelia_driver::{AgenticMessage, Driver};
use amelia_scheduler::{Orchestrator, SchedulerConfig, StaticDriverFactory};
use amelia_store::{CheckpointStore, InMemoryStore, StateStore};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;

pub struct Harness {
    pub orchestrator: Arc<Orchestrator<FakeClock>>,
    pub store: Arc<InMemoryStore>,
    pub profile: Profile,
}

pub fn test_profile() -> Profile {
    Profile {
        id: ProfileId::new(),
        name: "default".to_string(),
        tracker: TrackerKind::Noop,
        working_dir_root: std::env::temp_dir(),
        plan_output_dir: std::env::temp_dir(),
        max_review_iterations: 3,
        max_plan_revisions: 2,
        agents: HashMap::new(),
        sandbox: SandboxConfig::none(),
        is_active: true,
    }
}

pub async fn harness(config: SchedulerConfig, driver: Arc<dyn Driver>) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let clock = FakeClock::new();
    let bus = Arc::new(amelia_bus::Sequencer::new(store.clone(), clock.clone()));
    let driver_factory = Arc::new(StaticDriverFactory::new(driver));

    let profile = store.create_profile(test_profile()).await.unwrap();

    let state_store: Arc<dyn StateStore> = store.clone();
    let checkpoint_store: Arc<dyn CheckpointStore> = store.clone();
    let orchestrator = Arc::new(Orchestrator::new(state_store, checkpoint_store, bus, driver_factory, clock, config));

    Harness { orchestrator, store, profile }
}

pub async fn new_workflow(h: &Harness, issue_id: &str, worktree_path: std::path::PathBuf) -> Workflow {
    let workflow = Workflow::new(issue_id, worktree_path, h.profile.id, WorkflowType::Full, 0);
    h.store.create_workflow(workflow).await.unwrap()
}

pub fn architect_json(plan_markdown: &str, summary: &str) -> String {
    serde_json::json!({"plan_markdown": plan_markdown, "summary": summary}).to_string()
}

pub fn reviewer_approved_json() -> String {
    serde_json::json!({"approved": true, "comments": []}).to_string()
}

pub const VALID_ONE_TASK_PLAN: &str = "### Task 1: Write function\nImplement the add function with tests.\n";
pub const INVALID_PLAN: &str = "no task sections in here at all";

/// Polls `store` until `workflow_id` reaches `target` status or `max_attempts`
/// 10ms ticks elapse, returning the last observed status either way.
pub async fn wait_for_status(
    store: &InMemoryStore,
    workflow_id: amelia_core::WorkflowId,
    target: amelia_core::WorkflowStatus,
    max_attempts: u32,
) -> amelia_core::WorkflowStatus {
    for _ in 0..max_attempts {
        let status = store.get_workflow(workflow_id).await.unwrap().status;
        if status == target {
            return status;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    store.get_workflow(workflow_id).await.unwrap().status
}

/// Pops one scripted `Result` response per `execute_agentic` call, in
/// order, standing in for the architect/developer/reviewer across a run.
/// Panics if called more times than it was scripted for.
pub struct ScriptedDriver {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedDriver {
    pub fn new(responses: Vec<String>) -> Self {
        Self { responses: Mutex::new(responses.into_iter().collect()) }
    }
}

#[async_trait::async_trait]
impl Driver for ScriptedDriver {
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
        let content = self.responses.lock().unwrap().pop_front().expect("script exhausted");
        Ok(Box::pin(futures::stream::iter(vec![Ok(AgenticMessage::Result { content })])))
    }

    async fn cleanup_session(&self, _session_id: &str) -> bool {
        true
    }

    fn get_usage(&self) -> Option<amelia_driver::DriverUsage> {
        None
    }
}
