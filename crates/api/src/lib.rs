// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/WebSocket bindings over the orchestrator kernel: REST for workflow,
//! profile and settings CRUD, a WebSocket for live event fanout, and health
//! checks for operators.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

pub use error::ApiError;
pub use state::ApiState;

use amelia_core::ServerSettings;
use axum::Router;
use tokio::net::TcpListener;

pub fn router(state: ApiState) -> Router {
    routes::router(state)
}

/// Binds to `settings.bind_addr()` and serves until the process is killed.
pub async fn serve(settings: &ServerSettings, state: ApiState) -> std::io::Result<()> {
    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "amelia-api listening");
    axum::serve(listener, router(state)).await
}

/// Like [`serve`] but stops accepting new connections once `shutdown` resolves,
/// letting in-flight requests drain.
pub async fn serve_until<F>(settings: &ServerSettings, state: ApiState, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "amelia-api listening");
    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await
}
