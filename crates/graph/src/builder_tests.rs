use super::*;
use crate::chunk::GraphChunk;
use crate::state_update::StateUpdate;
use amelia_core::test_support::fixture_pipeline_state;
use amelia_core::{FakeClock, Profile, ProfileId, SandboxConfig, TrackerKind, WorkflowId};
use amelia_driver::FakeDriver;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;

struct CountingNode {
    name: &'static str,
}

#[async_trait]
impl Node<FakeClock> for CountingNode {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self, _state: &PipelineState, _ctx: &NodeContext<FakeClock>) -> Result<StateUpdate, GraphError> {
        let mut update = StateUpdate::new();
        update.current_task_index = Some(1);
        Ok(update)
    }
}

struct RoutingNode;

#[async_trait]
impl Node<FakeClock> for RoutingNode {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn run(&self, state: &PipelineState, _ctx: &NodeContext<FakeClock>) -> Result<StateUpdate, GraphError> {
        let mut update = StateUpdate::new();
        update.review_pass = Some(state.review_pass + 1);
        Ok(update)
    }
}

fn test_profile() -> Profile {
    Profile {
        id: ProfileId::new(),
        name: "test".to_string(),
        tracker: TrackerKind::Noop,
        working_dir_root: std::env::temp_dir(),
        plan_output_dir: std::path::PathBuf::from("plans"),
        max_review_iterations: 3,
        max_plan_revisions: 2,
        agents: HashMap::new(),
        sandbox: SandboxConfig::none(),
        is_active: true,
    }
}

fn test_ctx() -> NodeContext<FakeClock> {
    let driver: Arc<dyn amelia_driver::Driver> = Arc::new(FakeDriver::new(vec![]));
    NodeContext::new(driver, std::env::temp_dir(), test_profile(), FakeClock::new())
}

#[tokio::test]
async fn linear_edges_run_in_order_then_end() {
    let mut builder: GraphBuilder<FakeClock> = GraphBuilder::new();
    builder.add_node(Arc::new(CountingNode { name: "a" }));
    builder.add_node(Arc::new(CountingNode { name: "b" }));
    builder.add_edge("a", "b");
    builder.set_entry_point("a");
    let graph = Arc::new(builder.build().unwrap());

    let state = fixture_pipeline_state(WorkflowId::new(), ProfileId::new());
    let chunks: Vec<_> = graph.invoke_streaming(state, test_ctx(), None).collect().await;
    let chunks: Vec<_> = chunks.into_iter().collect::<Result<Vec<_>, _>>().unwrap();

    let task_names: Vec<&str> = chunks
        .iter()
        .filter_map(|c| if let GraphChunk::Tasks(n) = c { Some(n.as_str()) } else { None })
        .collect();
    assert_eq!(task_names, vec!["a", "b"]);
}

#[tokio::test]
async fn conditional_edge_follows_the_router_label() {
    let mut builder: GraphBuilder<FakeClock> = GraphBuilder::new();
    builder.add_node(Arc::new(RoutingNode));
    builder.add_node(Arc::new(CountingNode { name: "continue_target" }));
    let mut routes = HashMap::new();
    routes.insert("continue".to_string(), "continue_target".to_string());
    routes.insert("end".to_string(), END.to_string());
    builder.add_conditional_edges(
        "router",
        |state: &PipelineState| if state.review_pass < 1 { "continue".to_string() } else { "end".to_string() },
        routes,
    );
    builder.set_entry_point("router");
    let graph = Arc::new(builder.build().unwrap());

    let state = fixture_pipeline_state(WorkflowId::new(), ProfileId::new());
    let chunks: Vec<_> =
        graph.invoke_streaming(state, test_ctx(), None).collect::<Vec<_>>().await.into_iter().collect::<Result<Vec<_>, _>>().unwrap();

    let task_names: Vec<&str> = chunks
        .iter()
        .filter_map(|c| if let GraphChunk::Tasks(n) = c { Some(n.as_str()) } else { None })
        .collect();
    assert_eq!(task_names, vec!["router", "continue_target"]);
}

#[tokio::test]
async fn interrupt_before_a_node_suspends_without_running_it() {
    let mut builder: GraphBuilder<FakeClock> = GraphBuilder::new();
    builder.add_node(Arc::new(CountingNode { name: "gate" }));
    builder.set_entry_point("gate");
    builder.interrupt_before("gate");
    let graph = Arc::new(builder.build().unwrap());

    let state = fixture_pipeline_state(WorkflowId::new(), ProfileId::new());
    let chunks: Vec<_> =
        graph.invoke_streaming(state, test_ctx(), None).collect::<Vec<_>>().await.into_iter().collect::<Result<Vec<_>, _>>().unwrap();

    assert_eq!(chunks.len(), 1);
    assert!(matches!(&chunks[0], GraphChunk::Interrupt(p) if p.node == "gate"));
}

#[tokio::test]
async fn resuming_past_an_interrupt_does_not_retrigger_it() {
    let mut builder: GraphBuilder<FakeClock> = GraphBuilder::new();
    builder.add_node(Arc::new(CountingNode { name: "gate" }));
    builder.set_entry_point("gate");
    builder.interrupt_before("gate");
    let graph = Arc::new(builder.build().unwrap());

    let state = fixture_pipeline_state(WorkflowId::new(), ProfileId::new());
    let chunks: Vec<_> = graph
        .invoke_streaming(state, test_ctx(), Some("gate".to_string()))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert!(matches!(&chunks[0], GraphChunk::Tasks(n) if n == "gate"));
    assert!(matches!(&chunks[1], GraphChunk::Updates(_)));
}

#[tokio::test]
async fn a_node_not_followed_by_any_edge_ends_the_graph() {
    let mut builder: GraphBuilder<FakeClock> = GraphBuilder::new();
    builder.add_node(Arc::new(CountingNode { name: "solo" }));
    builder.set_entry_point("solo");
    let graph = Arc::new(builder.build().unwrap());

    let state = fixture_pipeline_state(WorkflowId::new(), ProfileId::new());
    let chunks: Vec<_> =
        graph.invoke_streaming(state, test_ctx(), None).collect::<Vec<_>>().await.into_iter().collect::<Result<Vec<_>, _>>().unwrap();

    assert_eq!(chunks.len(), 2);
    assert!(matches!(&chunks[0], GraphChunk::Tasks(_)));
    assert!(matches!(&chunks[1], GraphChunk::Updates(_)));
}
