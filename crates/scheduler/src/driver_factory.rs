// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decouples the scheduler from driver construction (CLI subprocess vs.
//! provider API vs. sandboxed container all need different setup per
//! profile). Collaborators are taken as constructor parameters rather than
//! hardcoded, so the scheduler stays agnostic to which driver kind a
//! profile resolves to.

use crate::error::SchedulerError;
use amelia_core::Profile;
use amelia_driver::Driver;
use amelia_sandbox::WorktreeManager;
use std::sync::Arc;

/// Builds the driver a workflow should run its agents through, given its
/// resolved profile. Implementations decide which [`Driver`] (CLI, API,
/// container) a profile's agent configuration calls for. Construction can
/// fail — a container provider may not connect, a credential may not
/// resolve — so callers propagate the error rather than panicking mid-run.
pub trait DriverFactory: Send + Sync {
    fn build(&self, profile: &Profile) -> Result<Arc<dyn Driver>, SchedulerError>;

    /// The worktree manager backing `profile`'s sandbox, if the built driver
    /// is sandboxed. `None` for non-sandboxed profiles, where the workflow's
    /// worktree lives directly on the host and needs no in-container clone.
    fn worktree_manager(&self, _profile: &Profile) -> Option<Arc<WorktreeManager>> {
        None
    }
}

/// A factory that always returns the same driver instance, for tests and
/// for single-driver deployments that don't branch on profile.
pub struct StaticDriverFactory {
    driver: Arc<dyn Driver>,
}

impl StaticDriverFactory {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver }
    }
}

impl DriverFactory for StaticDriverFactory {
    fn build(&self, _profile: &Profile) -> Result<Arc<dyn Driver>, SchedulerError> {
        Ok(self.driver.clone())
    }
}
