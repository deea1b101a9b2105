// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The production [`DriverFactory`]: resolves a profile's sandbox and
//! agent configuration into a concrete driver, branching on
//! `SandboxConfig::mode` first (container sandboxing overrides CLI-flavor
//! selection, since `ContainerDriver` shells out to a flavor-agnostic
//! `worker` binary inside the container) and on the profile's agent
//! [`DriverKind`] otherwise.

use amelia_core::agent_config::{AgentConfig, DriverKind};
use amelia_core::sandbox_config::SandboxMode;
use amelia_core::{Profile, ProfileId};
use amelia_driver::{ApiDriver, CliDriver, CliFlavor, ContainerDriver, Driver};
use amelia_sandbox::credential_proxy::{self, Credential};
use amelia_sandbox::{DockerSandboxProvider, SandboxProvider, WorktreeManager};
use amelia_scheduler::{DriverFactory, SchedulerError};
use dashmap::DashMap;
use std::sync::Arc;

const DEFAULT_SANDBOX_IMAGE: &str = "amelia/sandbox:latest";
const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// One [`Driver`]/[`WorktreeManager`] pair per profile, cached for the
/// lifetime of the process. `NodeContext` carries a single driver for a
/// whole workflow run, so a profile's driver is built once per invocation
/// and reused across concurrent workflows on that profile rather than
/// reconnecting to the sandbox container on every attempt.
pub struct ProfileDriverFactory {
    built: DashMap<ProfileId, (Arc<dyn Driver>, Option<Arc<WorktreeManager>>)>,
}

impl ProfileDriverFactory {
    pub fn new() -> Self {
        Self { built: DashMap::new() }
    }

    fn build_pair(&self, profile: &Profile) -> Result<(Arc<dyn Driver>, Option<Arc<WorktreeManager>>), SchedulerError> {
        if profile.sandbox.mode == SandboxMode::Container {
            let image = profile.sandbox.image.clone().unwrap_or_else(|| DEFAULT_SANDBOX_IMAGE.to_string());
            let provider = DockerSandboxProvider::connect(
                profile.id,
                image,
                profile.sandbox.network_allowlist_enabled,
                profile.sandbox.network_allowed_hosts.clone(),
            )
            .map_err(|e| SchedulerError::DriverBuild(e.to_string()))?;
            let sandbox: Arc<dyn SandboxProvider> = Arc::new(provider);
            let worktree = Arc::new(WorktreeManager::new(sandbox.clone()));
            let driver: Arc<dyn Driver> = Arc::new(ContainerDriver::new(sandbox));
            return Ok((driver, Some(worktree)));
        }

        let kind = representative_driver_kind(profile);
        let driver: Arc<dyn Driver> = match kind {
            DriverKind::Claude => Arc::new(CliDriver::new(CliFlavor::Claude)),
            DriverKind::Codex => Arc::new(CliDriver::new(CliFlavor::Codex)),
            DriverKind::Api => {
                let base_url = representative_agent(profile)
                    .and_then(|agent| agent.options.get("base_url"))
                    .and_then(|v| v.as_str())
                    .unwrap_or(DEFAULT_API_BASE_URL)
                    .to_string();
                let api_key = match credential_proxy::resolve() {
                    Some(Credential::OAuthToken(token)) => token,
                    Some(Credential::ApiKey(key)) => key,
                    None => return Err(SchedulerError::DriverBuild("no host credential available for the api driver".into())),
                };
                Arc::new(ApiDriver::new(base_url, api_key))
            }
        };
        Ok((driver, None))
    }
}

impl Default for ProfileDriverFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverFactory for ProfileDriverFactory {
    fn build(&self, profile: &Profile) -> Result<Arc<dyn Driver>, SchedulerError> {
        if let Some(entry) = self.built.get(&profile.id) {
            return Ok(entry.0.clone());
        }
        let pair = self.build_pair(profile)?;
        let driver = pair.0.clone();
        self.built.insert(profile.id, pair);
        Ok(driver)
    }

    fn worktree_manager(&self, profile: &Profile) -> Option<Arc<WorktreeManager>> {
        if let Some(entry) = self.built.get(&profile.id) {
            return entry.1.clone();
        }
        let pair = self.build_pair(profile).ok()?;
        let worktree = pair.1.clone();
        self.built.insert(profile.id, pair);
        worktree
    }
}

/// Picks the agent config driving the profile-level driver choice:
/// `architect` if configured, else the first agent in the map, since
/// `NodeContext` shares one driver across every node in a workflow.
fn representative_agent(profile: &Profile) -> Option<&AgentConfig> {
    profile.agent("architect").or_else(|| profile.agents.values().next())
}

fn representative_driver_kind(profile: &Profile) -> DriverKind {
    representative_agent(profile).map(|agent| agent.driver).unwrap_or(DriverKind::Claude)
}
