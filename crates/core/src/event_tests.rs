// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn event_type_round_trips_through_json() {
    for ty in [
        EventType::WorkflowStarted,
        EventType::StageCompleted,
        EventType::ApprovalRequired,
        EventType::Other("vendor:custom".into()),
    ] {
        let json = serde_json::to_string(&ty).unwrap();
        let back: EventType = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, back);
    }
}

#[test]
fn unknown_event_type_deserializes_to_other() {
    let ty: EventType = serde_json::from_str("\"some_future_type\"").unwrap();
    assert_eq!(ty, EventType::Other("some_future_type".into()));
}

#[test]
fn domain_grouping_matches_spec() {
    assert_eq!(EventType::WorkflowStarted.domain(), "workflow");
    assert_eq!(EventType::StageStarted.domain(), "stage");
    assert_eq!(EventType::ToolCall.domain(), "tool");
    assert_eq!(EventType::ApprovalRequired.domain(), "approval");
    assert_eq!(EventType::TokenUsageRecorded.domain(), "token_usage");
}

#[test]
fn log_fields_include_workflow_sequence_and_type() {
    let event = Event {
        id: EventId::new(),
        workflow_id: WorkflowId::new(),
        sequence: 7,
        timestamp_ms: 0,
        level: EventLevel::Info,
        event_type: EventType::StageStarted,
        agent: Some("architect".into()),
        message: "starting".into(),
        data: serde_json::json!({}),
        is_error: false,
    };
    let fields = event.log_fields();
    assert!(fields.contains(&("sequence", "7".to_string())));
    assert!(fields.contains(&("agent", "architect".to_string())));
}
