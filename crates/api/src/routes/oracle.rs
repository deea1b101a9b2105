// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-core consultation route.

use crate::error::ApiError;
use crate::state::ApiState;
use amelia_agents::{Oracle, OracleInput};
use amelia_core::{Clock, OracleConsultation, ProfileId, SystemClock};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub fn routes() -> Router<ApiState> {
    Router::new().route("/api/oracle/consult", post(consult))
}

#[derive(Debug, Deserialize)]
struct ConsultRequest {
    problem: String,
    working_dir: PathBuf,
    #[serde(default)]
    files: Option<Vec<String>>,
    /// Accepted for forward compatibility; driver selection is scoped to
    /// the profile, not overridable per call.
    #[serde(default)]
    #[allow(dead_code)]
    model: Option<String>,
    #[serde(default)]
    profile_id: Option<ProfileId>,
}

#[derive(Debug, Serialize)]
struct ConsultResponse {
    advice: String,
    consultation: OracleConsultation,
}

async fn consult(State(state): State<ApiState>, Json(request): Json<ConsultRequest>) -> Result<(StatusCode, Json<ConsultResponse>), ApiError> {
    let profile = match request.profile_id {
        Some(id) => state.store.get_profile(id).await?,
        None => state.store.get_active_profile().await?,
    };

    if !request.working_dir.starts_with(&profile.working_dir_root) {
        return Err(ApiError::BadRequest(format!(
            "working_dir {} is outside profile root {}",
            request.working_dir.display(),
            profile.working_dir_root.display()
        )));
    }

    let mut file_context = Vec::new();
    for relative in request.files.into_iter().flatten() {
        let full_path = request.working_dir.join(&relative);
        let contents = std::fs::read_to_string(&full_path)
            .map_err(|e| ApiError::BadRequest(format!("failed to read {relative}: {e}")))?;
        file_context.push((relative, contents));
    }

    let driver = state.driver_factory.build(&profile)?;
    let oracle = Oracle::new(driver.as_ref());
    let now_ms = SystemClock.epoch_ms();
    let consultation = oracle.run(OracleInput { problem: &request.problem, file_context: &file_context, now_ms }).await?;

    Ok((StatusCode::ACCEPTED, Json(ConsultResponse { advice: consultation.advice.clone(), consultation })))
}
