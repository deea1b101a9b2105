use super::*;
use crate::chunk::GraphChunk;
use crate::node::NodeContext;
use amelia_core::test_support::fixture_pipeline_state;
use amelia_core::{FakeClock, PipelineState, Profile, ProfileId, SandboxConfig, TrackerKind, WorkflowId};
use amelia_driver::{AgenticMessage, AgenticRequest, Driver, DriverError, GenerateRequest, GenerateResult};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex as StdMutex;

/// Replays a fixed, ordered list of single-`Result` agentic responses —
/// one per `execute_agentic` call — so a single driver can stand in for
/// architect, developer and reviewer calls across one graph run.
struct ScriptedPipelineDriver {
    responses: StdMutex<VecDeque<String>>,
}

impl ScriptedPipelineDriver {
    fn new(responses: Vec<&str>) -> Self {
        Self { responses: StdMutex::new(responses.into_iter().map(str::to_string).collect()) }
    }
}

#[async_trait::async_trait]
impl Driver for ScriptedPipelineDriver {
    async fn generate(&self, _request: GenerateRequest<'_>) -> Result<GenerateResult, DriverError> {
        Err(DriverError::NotImplemented("generate is not used by the implementation pipeline".to_string()))
    }

    async fn execute_agentic(
        &self,
        _request: AgenticRequest<'_>,
    ) -> Result<BoxStream<'static, Result<AgenticMessage, DriverError>>, DriverError> {
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

fn test_profile(plan_output_dir: std::path::PathBuf) -> Profile {
    Profile {
        id: ProfileId::new(),
        name: "test".to_string(),
        tracker: TrackerKind::Noop,
        working_dir_root: std::env::temp_dir(),
        plan_output_dir,
        max_review_iterations: 3,
        max_plan_revisions: 2,
        agents: HashMap::new(),
        sandbox: SandboxConfig::none(),
        is_active: true,
    }
}

fn apply_updates(chunks: &[GraphChunk], state: &mut PipelineState) {
    for chunk in chunks {
        if let GraphChunk::Updates(update) = chunk {
            update.clone().merge_into(state);
        }
    }
}

#[tokio::test]
async fn two_task_run_suspends_for_approval_then_completes_after_resume() {
    let dir = tempfile::tempdir().unwrap();
    let architect_json = serde_json::json!({
        "plan_markdown": "### Task 1: Write function\nImplement the add function with tests.\n\n### Task 2: Wire it up\nExport the function from the crate root.\n",
        "summary": "two task plan",
    })
    .to_string();
    let reviewer_approved = serde_json::json!({"approved": true, "comments": []}).to_string();

    let driver = ScriptedPipelineDriver::new(vec![
        &architect_json,
        "developer implemented task 1",
        &reviewer_approved,
        "developer implemented task 2",
        &reviewer_approved,
    ]);
    let driver: std::sync::Arc<dyn Driver> = std::sync::Arc::new(driver);

    let graph = std::sync::Arc::new(build_implementation_graph::<FakeClock>().unwrap());
    assert_eq!(graph.entry_point(), NODE_ARCHITECT);
    assert_eq!(graph.node_count(), 6);

    let clock = FakeClock::new();
    let first_ctx = NodeContext::new(driver.clone(), dir.path().to_path_buf(), test_profile(dir.path().to_path_buf()), clock.clone());

    let mut state = fixture_pipeline_state(WorkflowId::new(), ProfileId::new());
    state.issue = Some(serde_json::json!({"title": "add a function"}));
    state.goal = Some("add the function".to_string());

    let first_run: Vec<_> = graph
        .clone()
        .invoke_streaming(state.clone(), first_ctx, None)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert!(matches!(first_run.last().unwrap(), GraphChunk::Interrupt(p) if p.node == NODE_HUMAN_APPROVAL));
    apply_updates(&first_run, &mut state);
    assert_eq!(state.total_tasks, Some(2));

    let second_ctx = NodeContext::new(driver, dir.path().to_path_buf(), test_profile(dir.path().to_path_buf()), clock);
    let second_run: Vec<_> = graph
        .invoke_streaming(state.clone(), second_ctx, Some(NODE_HUMAN_APPROVAL.to_string()))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    apply_updates(&second_run, &mut state);

    let task_names: Vec<&str> = second_run
        .iter()
        .filter_map(|c| if let GraphChunk::Tasks(n) = c { Some(n.as_str()) } else { None })
        .collect();
    assert_eq!(
        task_names,
        vec![NODE_HUMAN_APPROVAL, NODE_DEVELOPER, NODE_REVIEWER, NODE_NEXT_TASK, NODE_DEVELOPER, NODE_REVIEWER]
    );
    assert_eq!(state.current_task_index, 1);
}
