// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared handler state.

use amelia_core::SystemClock;
use amelia_scheduler::{Orchestrator, SchedulerConfig};
use amelia_store::{CheckpointStore, StateStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Everything a route handler needs, cloned cheaply per-request (every
/// field is an `Arc` or a plain counter).
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn StateStore>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub bus: Arc<amelia_bus::Sequencer<SystemClock>>,
    pub orchestrator: Arc<Orchestrator<SystemClock>>,
    pub driver_factory: Arc<dyn amelia_scheduler::DriverFactory>,
    pub config: SchedulerConfig,
    started_at: Instant,
    websocket_connections: Arc<AtomicUsize>,
}

impl ApiState {
    pub fn new(
        store: Arc<dyn StateStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        bus: Arc<amelia_bus::Sequencer<SystemClock>>,
        orchestrator: Arc<Orchestrator<SystemClock>>,
        driver_factory: Arc<dyn amelia_scheduler::DriverFactory>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            checkpoints,
            bus,
            orchestrator,
            driver_factory,
            config,
            started_at: Instant::now(),
            websocket_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn websocket_connections(&self) -> usize {
        self.websocket_connections.load(Ordering::Relaxed)
    }

    /// RAII-style guard incrementing the live connection count on creation
    /// and decrementing it on drop, so a panicking/disconnecting socket task
    /// can't leak the counter upward.
    pub fn track_websocket_connection(&self) -> WebSocketConnectionGuard {
        self.websocket_connections.fetch_add(1, Ordering::Relaxed);
        WebSocketConnectionGuard { counter: self.websocket_connections.clone() }
    }
}

pub struct WebSocketConnectionGuard {
    counter: Arc<AtomicUsize>,
}

impl Drop for WebSocketConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}
