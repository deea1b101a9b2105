// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile CRUD and activation routes under `/api/profiles`.

use crate::error::ApiError;
use crate::state::ApiState;
use amelia_core::{Profile, ProfileId};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/profiles", get(list_profiles).post(create_profile))
        .route("/api/profiles/:id", get(get_profile).put(update_profile).delete(delete_profile))
        .route("/api/profiles/:id/activate", post(activate_profile))
}

async fn list_profiles(State(state): State<ApiState>) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(state.store.list_profiles().await?))
}

async fn get_profile(State(state): State<ApiState>, Path(id): Path<ProfileId>) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.store.get_profile(id).await?))
}

async fn create_profile(State(state): State<ApiState>, Json(profile): Json<Profile>) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let created = state.store.create_profile(profile).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_profile(
    State(state): State<ApiState>,
    Path(id): Path<ProfileId>,
    Json(mut profile): Json<Profile>,
) -> Result<Json<Profile>, ApiError> {
    if profile.id != id {
        return Err(ApiError::BadRequest("profile id in body does not match the path".to_string()));
    }
    profile.id = id;
    Ok(Json(state.store.update_profile(profile).await?))
}

async fn delete_profile(State(state): State<ApiState>, Path(id): Path<ProfileId>) -> Result<StatusCode, ApiError> {
    state.store.delete_profile(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn activate_profile(State(state): State<ApiState>, Path(id): Path<ProfileId>) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.store.set_active_profile(id).await?))
}
