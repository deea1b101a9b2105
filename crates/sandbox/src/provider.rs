// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox execution protocol.
//!
//! One trait per concern, implementations swappable behind `Arc<dyn _>`.

use crate::error::SandboxError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashMap;
use std::path::PathBuf;

/// A single line of output from a sandboxed command.
#[derive(Debug, Clone)]
pub enum ExecLine {
    Stdout(String),
    Stderr(String),
}

/// A command to execute inside (or via) a sandbox.
#[derive(Debug, Clone)]
pub struct ExecCommand {
    pub cmd: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub stdin: Option<String>,
}

impl ExecCommand {
    pub fn new(cmd: Vec<String>) -> Self {
        Self { cmd, cwd: None, env: HashMap::new(), stdin: None }
    }

    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }
}

/// Uniform abstraction over "a place that runs commands".
///
/// The worktree manager and credential proxy are built on top of this
/// trait, never bypassing it to talk to a container runtime directly.
#[async_trait]
pub trait SandboxProvider: Send + Sync + 'static {
    /// Ensure the sandbox's backing resource (container, process group) is running.
    async fn ensure_running(&self) -> Result<(), SandboxError>;

    /// Execute a command, streaming stdout/stderr lines as they arrive.
    async fn exec_stream(
        &self,
        command: ExecCommand,
    ) -> Result<BoxStream<'static, Result<ExecLine, SandboxError>>, SandboxError>;

    /// Tear down the backing resource. Best-effort; errors are logged, not propagated.
    async fn teardown(&self);

    /// Point-in-time liveness check.
    async fn health_check(&self) -> Result<(), SandboxError>;
}
