// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server settings routes.

use crate::error::ApiError;
use crate::state::ApiState;
use amelia_core::ServerSettings;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

pub fn routes() -> Router<ApiState> {
    Router::new().route("/api/settings", get(get_settings).put(update_settings))
}

async fn get_settings(State(state): State<ApiState>) -> Result<Json<ServerSettings>, ApiError> {
    Ok(Json(state.store.get_settings().await?))
}

async fn update_settings(State(state): State<ApiState>, Json(settings): Json<ServerSettings>) -> Result<Json<ServerSettings>, ApiError> {
    Ok(Json(state.store.update_settings(settings).await?))
}
