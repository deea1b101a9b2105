// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The node trait every pipeline stage implements, and the
//! per-invocation configuration the orchestrator is required to supply
//! ("thread_id=workflow_id, execution_mode=server, profile, repository,
//! prompts, stream_emitter"). A missing `profile` or `repository` is a
//! configuration error raised at graph-build time, not a runtime surprise.

use crate::error::GraphError;
use crate::state_update::StateUpdate;
use amelia_core::{Clock, PipelineState, Profile};
use amelia_driver::Driver;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a node needs besides the frozen state it is handed: the
/// driver to invoke agents with, the repository worktree it operates in,
/// the active profile (iteration budgets, agent configs), and a clock for
/// any node that needs to stamp a timestamp (oracle consultations, history
/// entries) without reaching for wall-clock time directly.
pub struct NodeContext<C: Clock> {
    pub driver: Arc<dyn Driver>,
    pub repository: PathBuf,
    pub profile: Profile,
    pub clock: C,
}

impl<C: Clock> NodeContext<C> {
    pub fn new(driver: Arc<dyn Driver>, repository: PathBuf, profile: Profile, clock: C) -> Self {
        Self { driver, repository, profile, clock }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }
}

/// One stage of the implementation pipeline. Nodes never mutate
/// `PipelineState` directly: they read it and return a sparse
/// [`StateUpdate`] that the graph merges in with the declared reducers.
#[async_trait]
pub trait Node<C: Clock>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, state: &PipelineState, ctx: &NodeContext<C>) -> Result<StateUpdate, GraphError>;
}
