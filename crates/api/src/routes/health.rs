// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health check routes.

use crate::state::ApiState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/health/live", get(live))
        .route("/api/health/ready", get(ready))
}

#[derive(Debug, Serialize)]
struct DatabaseHealth {
    status: &'static str,
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    active_workflows: usize,
    websocket_connections: usize,
    memory_mb: f64,
    cpu_percent: f64,
    database: DatabaseHealth,
}

async fn health(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.store.get_settings().await {
        Ok(settings) => DatabaseHealth { status: "ok", mode: database_mode(&settings.database_url), error: None },
        Err(e) => DatabaseHealth { status: "error", mode: "unknown", error: Some(e.to_string()) },
    };

    let status = if database.status == "ok" { "healthy" } else { "degraded" };
    let code = if status == "healthy" { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    let (memory_mb, cpu_percent) = process_metrics();

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        active_workflows: state.orchestrator.active_count(),
        websocket_connections: state.websocket_connections(),
        memory_mb,
        cpu_percent,
        database,
    };
    (code, Json(response))
}

/// Always 200 while the process is responding at all.
async fn live() -> StatusCode {
    StatusCode::OK
}

async fn ready(State(state): State<ApiState>) -> StatusCode {
    match state.store.get_settings().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn database_mode(database_url: &str) -> &'static str {
    if database_url.starts_with("postgres") {
        "postgres"
    } else if database_url.starts_with("sqlite") {
        "sqlite"
    } else {
        "unknown"
    }
}

/// Best-effort resident memory (MB) and CPU time (as a percent of wall
/// clock since process start) from `/proc/self`. Returns zeros off Linux
/// or if `/proc` is unreadable — this is an observability nicety, not load
/// bearing for correctness.
fn process_metrics() -> (f64, f64) {
    let memory_mb = std::fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| status.lines().find(|line| line.starts_with("VmRSS:")).map(str::to_string))
        .and_then(|line| line.split_whitespace().nth(1).map(str::to_string))
        .and_then(|kb| kb.parse::<f64>().ok())
        .map(|kb| kb / 1024.0)
        .unwrap_or(0.0);

    let cpu_percent = std::fs::read_to_string("/proc/self/stat")
        .ok()
        .and_then(|stat| {
            let fields: Vec<&str> = stat.rsplit(')').next()?.split_whitespace().collect();
            let utime: f64 = fields.get(11)?.parse().ok()?;
            let stime: f64 = fields.get(12)?.parse().ok()?;
            let ticks_per_sec = 100.0;
            Some((utime + stime) / ticks_per_sec)
        })
        .unwrap_or(0.0);

    (memory_mb, cpu_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_mode_recognizes_known_schemes() {
        assert_eq!(database_mode("postgres://localhost/amelia"), "postgres");
        assert_eq!(database_mode("sqlite://amelia.db"), "sqlite");
        assert_eq!(database_mode("mysql://localhost/amelia"), "unknown");
    }
}
