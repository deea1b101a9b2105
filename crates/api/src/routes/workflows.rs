// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow lifecycle routes: create, list, inspect, and drive through
//! approve/reject/cancel.

use crate::error::ApiError;
use crate::state::ApiState;
use amelia_core::{Clock, ProfileId, SystemClock, TrackerKind, Workflow, WorkflowId, WorkflowStatus, WorkflowType};
use amelia_store::WorkflowFilter;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/workflows", post(create_workflow).get(list_workflows))
        .route("/workflows/start-batch", post(start_batch))
        .route("/workflows/:id", get(get_workflow))
        .route("/workflows/:id/start", post(start_workflow))
        .route("/workflows/:id/approve", post(approve_workflow))
        .route("/workflows/:id/reject", post(reject_workflow))
        .route("/workflows/:id/cancel", post(cancel_workflow))
}

#[derive(Debug, Deserialize)]
struct CreateWorkflowRequest {
    issue_id: String,
    worktree_path: PathBuf,
    #[serde(default)]
    profile: Option<ProfileId>,
    #[serde(default)]
    task_title: Option<String>,
    #[serde(default)]
    task_description: Option<String>,
    #[serde(default = "default_true")]
    start: bool,
    #[serde(default)]
    plan_now: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct CreateWorkflowResponse {
    workflow_id: WorkflowId,
    status: WorkflowStatus,
}

async fn create_workflow(
    State(state): State<ApiState>,
    Json(request): Json<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<CreateWorkflowResponse>), ApiError> {
    let profile = match request.profile {
        Some(id) => state.store.get_profile(id).await?,
        None => state.store.get_active_profile().await?,
    };

    let has_task_fields = request.task_title.is_some() || request.task_description.is_some();
    if has_task_fields && profile.tracker != TrackerKind::Noop {
        return Err(ApiError::BadRequest(
            "task_title/task_description are only accepted when the profile's tracker is noop".to_string(),
        ));
    }

    let workflow_type = if request.plan_now { WorkflowType::PlanOnly } else { WorkflowType::Full };
    let now_ms = SystemClock.epoch_ms();
    let mut workflow = Workflow::new(request.issue_id, request.worktree_path, profile.id, workflow_type, now_ms);
    if has_task_fields {
        workflow.issue_cache = Some(serde_json::json!({
            "title": request.task_title,
            "description": request.task_description,
        }));
    }

    let workflow = state.store.create_workflow(workflow).await?;

    if request.start {
        state.orchestrator.start_workflow(workflow.id).await?;
    }

    Ok((StatusCode::CREATED, Json(CreateWorkflowResponse { workflow_id: workflow.id, status: workflow.status })))
}

#[derive(Debug, Deserialize)]
struct ListWorkflowsQuery {
    status: Option<String>,
    worktree: Option<PathBuf>,
}

async fn list_workflows(
    State(state): State<ApiState>,
    Query(query): Query<ListWorkflowsQuery>,
) -> Result<Json<Vec<Workflow>>, ApiError> {
    let status = match query.status {
        Some(raw) => Some(parse_workflow_status(&raw).ok_or_else(|| ApiError::BadRequest(format!("unknown status: {raw}")))?),
        None => None,
    };
    let filter = WorkflowFilter { status, worktree_path: query.worktree };
    Ok(Json(state.store.list_workflows(filter).await?))
}

async fn get_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>) -> Result<Json<Workflow>, ApiError> {
    Ok(Json(state.store.get_workflow(id).await?))
}

async fn start_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>) -> Result<StatusCode, ApiError> {
    state.orchestrator.start_workflow(id).await?;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
struct StartBatchRequest {
    #[serde(default)]
    workflow_ids: Option<Vec<WorkflowId>>,
    #[serde(default)]
    worktree_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct StartBatchResponse {
    started: Vec<WorkflowId>,
    errors: HashMap<String, String>,
}

async fn start_batch(
    State(state): State<ApiState>,
    Json(request): Json<StartBatchRequest>,
) -> Result<Json<StartBatchResponse>, ApiError> {
    let ids = match (request.workflow_ids, request.worktree_path) {
        (Some(ids), _) => ids,
        (None, Some(worktree_path)) => {
            let filter = WorkflowFilter { status: Some(WorkflowStatus::Pending), worktree_path: Some(worktree_path) };
            state.store.list_workflows(filter).await?.into_iter().map(|w| w.id).collect()
        }
        (None, None) => return Err(ApiError::BadRequest("one of workflow_ids or worktree_path is required".to_string())),
    };

    let mut started = Vec::new();
    let mut errors = HashMap::new();
    for id in ids {
        match state.orchestrator.start_workflow(id).await {
            Ok(()) => started.push(id),
            Err(e) => {
                errors.insert(id.to_string(), e.to_string());
            }
        }
    }
    Ok(Json(StartBatchResponse { started, errors }))
}

async fn approve_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>) -> Result<StatusCode, ApiError> {
    state.orchestrator.approve_workflow(id).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn reject_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>) -> Result<StatusCode, ApiError> {
    state.orchestrator.reject_workflow(id).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn cancel_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>) -> Result<StatusCode, ApiError> {
    state.orchestrator.cancel_workflow(id).await?;
    Ok(StatusCode::ACCEPTED)
}

fn parse_workflow_status(raw: &str) -> Option<WorkflowStatus> {
    match raw {
        "pending" => Some(WorkflowStatus::Pending),
        "in_progress" => Some(WorkflowStatus::InProgress),
        "blocked" => Some(WorkflowStatus::Blocked),
        "completed" => Some(WorkflowStatus::Completed),
        "failed" => Some(WorkflowStatus::Failed),
        "cancelled" => Some(WorkflowStatus::Cancelled),
        _ => None,
    }
}
