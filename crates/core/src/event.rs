// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persisted, sequenced event.

use serde::{Deserialize, Serialize};

use crate::workflow::WorkflowId;

crate::define_id! {
    /// Unique identifier for a single event record.
    pub struct EventId("evt-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

crate::simple_display! {
    EventLevel {
        Trace => "trace",
        Debug => "debug",
        Info => "info",
        Warning => "warning",
        Error => "error",
    }
}

/// The fixed enumeration of event types, grouped by domain.
///
/// Serializes as the bare string so the wire format matches what a REST/WS
/// client expects in `event_type`. Unknown strings round-trip through
/// `Other` rather than failing deserialization — events persisted by an
/// older binary must stay readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    // -- workflow --
    WorkflowStarted,
    WorkflowCompleted,
    WorkflowFailed,
    WorkflowRetry,
    WorkflowCancelled,
    // -- stage --
    StageStarted,
    StageCompleted,
    // -- agent --
    AgentThinking,
    AgentMessage,
    // -- tool --
    ToolCall,
    ToolResult,
    // -- oracle --
    OracleConsulted,
    // -- brainstorm --
    BrainstormMessage,
    // -- approval --
    ApprovalRequired,
    ApprovalGranted,
    ApprovalRejected,
    // -- token_usage --
    TokenUsageRecorded,
    Other(String),
}

impl EventType {
    pub fn as_wire_str(&self) -> &str {
        use EventType::*;
        match self {
            WorkflowStarted => "workflow_started",
            WorkflowCompleted => "workflow_completed",
            WorkflowFailed => "workflow_failed",
            WorkflowRetry => "workflow_retry",
            WorkflowCancelled => "workflow_cancelled",
            StageStarted => "stage_started",
            StageCompleted => "stage_completed",
            AgentThinking => "agent_thinking",
            AgentMessage => "agent_message",
            ToolCall => "tool_call",
            ToolResult => "tool_result",
            OracleConsulted => "oracle_consulted",
            BrainstormMessage => "brainstorm_message",
            ApprovalRequired => "approval_required",
            ApprovalGranted => "approval_granted",
            ApprovalRejected => "approval_rejected",
            TokenUsageRecorded => "token_usage_recorded",
            Other(s) => s.as_str(),
        }
    }

    pub fn from_wire_str(s: &str) -> Self {
        use EventType::*;
        match s {
            "workflow_started" => WorkflowStarted,
            "workflow_completed" => WorkflowCompleted,
            "workflow_failed" => WorkflowFailed,
            "workflow_retry" => WorkflowRetry,
            "workflow_cancelled" => WorkflowCancelled,
            "stage_started" => StageStarted,
            "stage_completed" => StageCompleted,
            "agent_thinking" => AgentThinking,
            "agent_message" => AgentMessage,
            "tool_call" => ToolCall,
            "tool_result" => ToolResult,
            "oracle_consulted" => OracleConsulted,
            "brainstorm_message" => BrainstormMessage,
            "approval_required" => ApprovalRequired,
            "approval_granted" => ApprovalGranted,
            "approval_rejected" => ApprovalRejected,
            "token_usage_recorded" => TokenUsageRecorded,
            other => Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EventType::from_wire_str(&s))
    }
}

impl EventType {
    pub fn domain(&self) -> &'static str {
        use EventType::*;
        match self {
            WorkflowStarted | WorkflowCompleted | WorkflowFailed | WorkflowRetry | WorkflowCancelled => "workflow",
            StageStarted | StageCompleted => "stage",
            AgentThinking | AgentMessage => "agent",
            ToolCall | ToolResult => "tool",
            OracleConsulted => "oracle",
            BrainstormMessage => "brainstorm",
            ApprovalRequired | ApprovalGranted | ApprovalRejected => "approval",
            TokenUsageRecorded => "token_usage",
            Other(_) => "other",
        }
    }
}

/// A single persisted, sequenced event on a workflow's log.
///
/// Invariant: `UNIQUE(workflow_id, sequence)`; `sequence` is 1-indexed and
/// gap-free within a workflow. See [`crate::error::FailureClass`] for what
/// happens if persistence of an event fails before fanout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub workflow_id: WorkflowId,
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub level: EventLevel,
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
    pub is_error: bool,
}

impl Event {
    /// Structured key=value fields for log lines: cheap, stable,
    /// grep-friendly.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("workflow_id", self.workflow_id.to_string()),
            ("sequence", self.sequence.to_string()),
            ("event_type", self.event_type.to_string()),
        ];
        if let Some(agent) = &self.agent {
            fields.push(("agent", agent.clone()));
        }
        fields
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
