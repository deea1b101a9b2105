// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST-boundary error taxonomy: every
//! layer underneath surfaces a typed error; this module is the one place
//! that decides the HTTP status a caller sees.

use amelia_core::WorkflowId;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("worktree already has an active workflow")]
    Conflict { existing: WorkflowId },

    #[error("at capacity")]
    Capacity,

    #[error(transparent)]
    Store(#[from] amelia_store::StoreError),

    #[error(transparent)]
    Scheduler(#[from] amelia_scheduler::SchedulerError),

    #[error(transparent)]
    Bus(#[from] amelia_bus::BusError),

    #[error(transparent)]
    Agent(#[from] amelia_agents::AgentError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Capacity => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(source) => store_status(source),
            ApiError::Scheduler(source) => scheduler_status(source),
            ApiError::Bus(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Agent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn existing_id(&self) -> Option<WorkflowId> {
        match self {
            ApiError::Conflict { existing } => Some(*existing),
            ApiError::Scheduler(amelia_scheduler::SchedulerError::Conflict { existing }) => Some(*existing),
            ApiError::Store(amelia_store::StoreError::WorktreeConflict { existing }) => Some(*existing),
            _ => None,
        }
    }
}

fn store_status(error: &amelia_store::StoreError) -> StatusCode {
    use amelia_store::StoreError::*;
    match error {
        WorkflowNotFound(_) | ProfileNotFound(_) | NoActiveProfile | CheckpointNotFound(_) => StatusCode::NOT_FOUND,
        WorktreeConflict { .. } => StatusCode::CONFLICT,
        InvalidTransition(_) => StatusCode::BAD_REQUEST,
        SequenceConflict { .. } | Database(_) | Migration(_) | Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn scheduler_status(error: &amelia_scheduler::SchedulerError) -> StatusCode {
    use amelia_scheduler::SchedulerError::*;
    match error {
        Conflict { .. } => StatusCode::CONFLICT,
        Capacity => StatusCode::SERVICE_UNAVAILABLE,
        InvalidState(_) => StatusCode::CONFLICT,
        Store(source) => store_status(source),
        Bus(_) | Graph(_) | Serde(_) | DriverBuild(_) | Sandbox(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let existing_id = self.existing_id();
        tracing::warn!(error = %self, status = %status, "request failed");

        let mut body = serde_json::json!({"error": self.to_string()});
        if let Some(existing) = existing_id {
            body["existing_id"] = serde_json::Value::String(existing.to_string());
        }
        (status, Json(body)).into_response()
    }
}
