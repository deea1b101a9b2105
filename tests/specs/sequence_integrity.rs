//! Scenario 5: 10 concurrent emits against the same new workflow assign
//! sequence numbers with no gaps and no duplicates.

use amelia_core::{FakeClock, WorkflowId, WorkflowType};
use amelia_store::{InMemoryStore, StateStore};
use std::collections::BTreeSet;
use std::sync::Arc;

#[tokio::test]
async fn concurrent_emits_yield_exactly_one_through_ten() {
    let store = Arc::new(InMemoryStore::new());
    let profile = store.create_profile(crate::support::test_profile()).await.unwrap();
    let workflow = amelia_core::Workflow::new("ISSUE-1", std::env::temp_dir().join("wt-seq"), profile.id, WorkflowType::Full, 0);
    let workflow = store.create_workflow(workflow).await.unwrap();

    let bus = Arc::new(amelia_bus::Sequencer::new(store.clone(), FakeClock::new()));

    let mut handles = Vec::new();
    for i in 0..10 {
        let bus = bus.clone();
        let workflow_id: WorkflowId = workflow.id;
        handles.push(tokio::spawn(async move {
            bus.emit(
                workflow_id,
                amelia_core::EventType::StageStarted,
                format!("concurrent emit {i}"),
                serde_json::json!({}),
                amelia_core::EventLevel::Info,
                None,
            )
            .await
            .unwrap()
        }));
    }

    let mut sequences = BTreeSet::new();
    for handle in handles {
        let event = handle.await.unwrap();
        sequences.insert(event.sequence);
    }

    assert_eq!(sequences, (1..=10).collect::<BTreeSet<_>>());
}
