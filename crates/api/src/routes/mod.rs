// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST route handlers, organized one module per resource.

pub mod health;
pub mod oracle;
pub mod profiles;
pub mod settings;
pub mod workflows;

use crate::state::ApiState;
use crate::ws;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

/// Assembles the full router: one `.merge` per resource, CORS layered over
/// the top.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(workflows::routes())
        .merge(oracle::routes())
        .merge(settings::routes())
        .merge(profiles::routes())
        .route("/ws/events", get(ws::events_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}
