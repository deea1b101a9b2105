// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The active-task cache: O(1)
//! per-worktree exclusion check and O(1) resolution of a worktree to its
//! running workflow, keyed the opposite direction from `by_workflow` for
//! O(1) cancellation lookup by id too.

use amelia_core::WorkflowId;
use dashmap::DashMap;
use std::path::PathBuf;
use tokio::task::JoinHandle;

/// One admitted workflow's registration. `task` is `None` while the
/// workflow is `blocked` on human approval — the slot is still held, but
/// nothing is currently running.
pub struct ActiveEntry {
    pub workflow_id: WorkflowId,
    pub task: Option<JoinHandle<()>>,
}

#[derive(Default)]
pub struct ActiveTasks {
    by_worktree: DashMap<PathBuf, ActiveEntry>,
    by_workflow: DashMap<WorkflowId, PathBuf>,
}

impl ActiveTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_worktree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_worktree.is_empty()
    }

    /// The workflow currently holding `worktree_path`'s exclusion slot, if any.
    pub fn holder_of(&self, worktree_path: &std::path::Path) -> Option<WorkflowId> {
        self.by_worktree.get(worktree_path).map(|entry| entry.workflow_id)
    }

    pub fn insert(&self, worktree_path: PathBuf, workflow_id: WorkflowId, task: Option<JoinHandle<()>>) {
        self.by_workflow.insert(workflow_id, worktree_path.clone());
        self.by_worktree.insert(worktree_path, ActiveEntry { workflow_id, task });
    }

    /// Replaces the task handle for an already-registered workflow (used on
    /// approval resume, where the worktree slot was never released).
    pub fn set_task(&self, worktree_path: &std::path::Path, task: JoinHandle<()>) {
        if let Some(mut entry) = self.by_worktree.get_mut(worktree_path) {
            entry.task = Some(task);
        }
    }

    /// Clears the task handle without releasing the worktree slot (the
    /// workflow is now `blocked` on approval; nothing is running).
    pub fn clear_task(&self, worktree_path: &std::path::Path) {
        if let Some(mut entry) = self.by_worktree.get_mut(worktree_path) {
            entry.task = None;
        }
    }

    pub fn worktree_of(&self, workflow_id: WorkflowId) -> Option<PathBuf> {
        self.by_workflow.get(&workflow_id).map(|entry| entry.clone())
    }

    /// Removes the registration entirely — the workflow has reached a
    /// terminal state and no longer holds the worktree slot.
    pub fn remove(&self, worktree_path: &std::path::Path) -> Option<ActiveEntry> {
        let removed = self.by_worktree.remove(worktree_path).map(|(_, entry)| entry);
        if let Some(entry) = &removed {
            self.by_workflow.remove(&entry.workflow_id);
        }
        removed
    }

    pub fn drain_handles(&self) -> Vec<JoinHandle<()>> {
        self.by_worktree.iter_mut().filter_map(|mut entry| entry.task.take()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holder_of_reports_none_for_an_untracked_worktree() {
        let tasks = ActiveTasks::new();
        assert!(tasks.holder_of(std::path::Path::new("/tmp/a")).is_none());
    }

    #[test]
    fn insert_then_remove_clears_both_indices() {
        let tasks = ActiveTasks::new();
        let id = WorkflowId::new();
        let path = PathBuf::from("/tmp/wt");
        tasks.insert(path.clone(), id, None);

        assert_eq!(tasks.holder_of(&path), Some(id));
        assert_eq!(tasks.worktree_of(id), Some(path.clone()));

        tasks.remove(&path);
        assert!(tasks.holder_of(&path).is_none());
        assert!(tasks.worktree_of(id).is_none());
    }
}
