// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-crate error taxonomy.

use amelia_core::WorkflowId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no active workflow for worktree, but a second create was attempted for an occupied slot (existing: {existing})")]
    WorktreeConflict { existing: WorkflowId },
    #[error("workflow {0} not found")]
    WorkflowNotFound(WorkflowId),
    #[error("profile {0} not found")]
    ProfileNotFound(String),
    #[error("no active profile is configured")]
    NoActiveProfile,
    #[error("checkpoint not found for workflow {0}")]
    CheckpointNotFound(WorkflowId),
    #[error("invalid event sequence: expected {expected}, got {got}")]
    SequenceConflict { expected: u64, got: u64 },
    #[error(transparent)]
    InvalidTransition(#[from] amelia_core::InvalidTransition),
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("serialization error")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this failure should be classified as [`amelia_core::FailureClass::Transient`]
    /// by the scheduler.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Database(_))
    }
}
