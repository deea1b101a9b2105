// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree manager: sets up a bare clone
//! inside the sandbox and carves one `git worktree` per workflow out of it.
//! Every git invocation goes through [`SandboxProvider::exec_stream`] —
//! this manager never talks to the container runtime directly.

use crate::error::SandboxError;
use crate::provider::{ExecCommand, ExecLine, SandboxProvider};
use amelia_core::WorkflowId;
use futures::StreamExt;
use std::sync::Arc;

const REPO_DIR: &str = "/workspace/repo";
const WORKTREES_DIR: &str = "/workspace/worktrees";

pub struct WorktreeManager {
    sandbox: Arc<dyn SandboxProvider>,
}

impl WorktreeManager {
    pub fn new(sandbox: Arc<dyn SandboxProvider>) -> Self {
        Self { sandbox }
    }

    /// Fetches the bare clone at [`REPO_DIR`], cloning it fresh if absent.
    pub async fn ensure_repo_cloned(&self, repo_url: &str) -> Result<(), SandboxError> {
        let probe = self.run(vec!["test", "-d", REPO_DIR]).await;
        if probe.is_ok() {
            return self.run(vec!["git", "--git-dir", REPO_DIR, "fetch", "origin"]).await.map(|_| ());
        }
        self.run(vec!["git", "clone", "--bare", repo_url, REPO_DIR]).await.map(|_| ())
    }

    /// Carves a worktree for `workflow_id` off `origin/{base_branch}`,
    /// pushing the new branch back to origin on success.
    pub async fn create_worktree(&self, workflow_id: WorkflowId, base_branch: &str) -> Result<String, SandboxError> {
        let path = worktree_path(workflow_id);
        let branch = workflow_id.to_string();
        self.run(vec![
            "git",
            "--git-dir",
            REPO_DIR,
            "worktree",
            "add",
            &path,
            "-b",
            &branch,
            &format!("origin/{base_branch}"),
        ])
        .await?;
        self.run(vec!["git", "--git-dir", REPO_DIR, "push", "origin", &branch]).await?;
        Ok(path)
    }

    /// Removes a workflow's worktree on any termination path (completion,
    /// failure, or cancellation) — best-effort, errors are logged not raised.
    pub async fn remove_worktree(&self, workflow_id: WorkflowId) {
        let path = worktree_path(workflow_id);
        if let Err(e) =
            self.run(vec!["git", "--git-dir", REPO_DIR, "worktree", "remove", &path, "--force"]).await
        {
            tracing::warn!(%workflow_id, error = %e, "worktree remove failed");
        }
    }

    async fn run(&self, argv: Vec<&str>) -> Result<(), SandboxError> {
        self.sandbox.ensure_running().await?;
        let cmd = ExecCommand::new(argv.into_iter().map(str::to_string).collect());
        let mut stream = self.sandbox.exec_stream(cmd).await?;
        while let Some(line) = stream.next().await {
            match line? {
                ExecLine::Stdout(text) | ExecLine::Stderr(text) => {
                    tracing::debug!(%text, "worktree manager git output");
                }
            }
        }
        Ok(())
    }
}

fn worktree_path(workflow_id: WorkflowId) -> String {
    format!("{WORKTREES_DIR}/{workflow_id}")
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
