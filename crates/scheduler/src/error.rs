// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler-boundary error taxonomy. The scheduler catches and classifies
//! errors at the graph stream boundary.

use amelia_core::{FailureClass, WorkflowId};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("worktree already has an active workflow: {existing}")]
    Conflict { existing: WorkflowId },

    #[error("scheduler is at max_concurrent capacity")]
    Capacity,

    #[error("workflow {0} is not in a state this operation allows")]
    InvalidState(WorkflowId),

    #[error(transparent)]
    Store(#[from] amelia_store::StoreError),

    #[error(transparent)]
    Bus(#[from] amelia_bus::BusError),

    #[error(transparent)]
    Graph(#[from] amelia_graph::GraphError),

    #[error("serialization error")]
    Serde(#[from] serde_json::Error),

    #[error("failed to build driver: {0}")]
    DriverBuild(String),

    #[error(transparent)]
    Sandbox(#[from] amelia_sandbox::SandboxError),
}

impl SchedulerError {
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Classifies an [`amelia_graph::GraphError`] surfaced from a node's `run`
/// into the scheduler's retry/escalation decision.
pub fn classify_graph_error(error: &amelia_graph::GraphError) -> FailureClass {
    use amelia_agents::AgentError;
    use amelia_driver::DriverError;
    use amelia_graph::GraphError;

    match error {
        GraphError::Agent(AgentError::Driver(DriverError::ModelProviderError(cause))) => {
            FailureClass::Transient(cause.clone())
        }
        GraphError::Agent(AgentError::Driver(DriverError::SchemaValidationError(msg))) => {
            FailureClass::Content(amelia_core::ContentFailure::SchemaValidation(msg.clone()))
        }
        other => FailureClass::Fatal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amelia_agents::AgentError;
    use amelia_driver::DriverError;
    use amelia_graph::GraphError;

    #[test]
    fn model_provider_errors_classify_as_transient() {
        let err = GraphError::Agent(AgentError::Driver(DriverError::ModelProviderError("timeout".into())));
        assert!(matches!(classify_graph_error(&err), FailureClass::Transient(_)));
    }

    #[test]
    fn schema_validation_errors_classify_as_content() {
        let err = GraphError::Agent(AgentError::Driver(DriverError::SchemaValidationError("bad json".into())));
        assert!(matches!(classify_graph_error(&err), FailureClass::Content(_)));
    }

    #[test]
    fn unknown_node_classifies_as_fatal() {
        let err = GraphError::UnknownNode("ghost".into());
        assert!(matches!(classify_graph_error(&err), FailureClass::Fatal(_)));
    }
}
