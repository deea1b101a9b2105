// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator-wide knobs.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Parallel workflows allowed at once, across all worktrees.
    pub max_concurrent: usize,
    /// How long admission (`start_workflow`) waits before giving up.
    pub workflow_start_timeout: Duration,
    /// Per-request timeout applied by callers wrapping scheduler calls.
    pub request_timeout: Duration,
    /// Idle cutoff for websocket subscribers (enforced by amelia-api).
    pub websocket_idle_timeout: Duration,
    /// Bounded wait for an in-flight task to exit after cancellation or
    /// during shutdown before it is abandoned and reaped anyway.
    pub shutdown_grace: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 16,
            workflow_start_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            websocket_idle_timeout: Duration::from_secs(300),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}
