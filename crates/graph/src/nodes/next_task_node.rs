// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advances `current_task_index` and resets the per-task review counter.

use crate::error::GraphError;
use crate::node::{Node, NodeContext};
use crate::state_update::StateUpdate;
use amelia_core::{Clock, HistoryEntry, PipelineState};
use async_trait::async_trait;

pub struct NextTaskNode;

#[async_trait]
impl<C: Clock> Node<C> for NextTaskNode {
    fn name(&self) -> &'static str {
        "next_task"
    }

    async fn run(&self, state: &PipelineState, ctx: &NodeContext<C>) -> Result<StateUpdate, GraphError> {
        let mut update = StateUpdate::new();
        let next_index = state.current_task_index + 1;
        update.current_task_index = Some(next_index);
        update.task_review_iteration = Some(0);
        update.history.push(HistoryEntry {
            ts_ms: ctx.now_ms(),
            actor: "next_task".to_string(),
            event: "task_advanced".to_string(),
            detail: Some(format!("now on task {}", next_index + 1)),
            tokens_used: None,
        });
        Ok(update)
    }
}
