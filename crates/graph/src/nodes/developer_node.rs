// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::GraphError;
use crate::node::{Node, NodeContext};
use crate::state_update::StateUpdate;
use amelia_agents::{Developer, DeveloperInput};
use amelia_core::{AgenticStatus, Clock, HistoryEntry, PipelineState};
use async_trait::async_trait;

pub struct DeveloperNode;

#[async_trait]
impl<C: Clock> Node<C> for DeveloperNode {
    fn name(&self) -> &'static str {
        "developer"
    }

    async fn run(&self, state: &PipelineState, ctx: &NodeContext<C>) -> Result<StateUpdate, GraphError> {
        let review_comments = state.structured_review.as_ref().map(|r| r.comments.clone()).unwrap_or_default();

        let developer = Developer::new(ctx.driver.as_ref());
        let output = developer
            .run(DeveloperInput {
                plan_markdown: state.plan_markdown.as_deref(),
                current_task_index: state.current_task_index,
                total_tasks: state.total_tasks,
                review_comments: &review_comments,
                cwd: &ctx.repository,
                session_id: state.driver_session_id.as_deref(),
            })
            .await?;

        let mut update = StateUpdate::new();
        update.tool_calls = output.tool_calls;
        update.tool_results = output.tool_results;
        update.final_response = output.final_response.clone();
        update.agentic_status = Some(AgenticStatus::Running);
        update.history.push(HistoryEntry {
            ts_ms: ctx.now_ms(),
            actor: "developer".to_string(),
            event: "task_attempted".to_string(),
            detail: output.final_response,
            tokens_used: None,
        });
        Ok(update)
    }
}
