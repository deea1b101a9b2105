// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::GraphError;
use crate::node::{Node, NodeContext};
use crate::state_update::StateUpdate;
use amelia_agents::{Reviewer, ReviewerInput};
use amelia_core::{Clock, HistoryEntry, PipelineState};
use async_trait::async_trait;

pub const ROUTE_DEVELOPER: &str = "developer";
pub const ROUTE_NEXT_TASK: &str = "next_task";
pub const ROUTE_END: &str = "end";

pub struct ReviewerNode;

#[async_trait]
impl<C: Clock> Node<C> for ReviewerNode {
    fn name(&self) -> &'static str {
        "reviewer"
    }

    async fn run(&self, state: &PipelineState, ctx: &NodeContext<C>) -> Result<StateUpdate, GraphError> {
        let reviewer = Reviewer::new(ctx.driver.as_ref());
        let review = reviewer
            .run(ReviewerInput {
                plan_markdown: state.plan_markdown.as_deref(),
                current_task_index: state.current_task_index,
                total_tasks: state.total_tasks,
                final_response: state.final_response.as_deref(),
                cwd: &ctx.repository,
                session_id: state.driver_session_id.as_deref(),
            })
            .await?;

        let mut update = StateUpdate::new();
        update.task_review_iteration = Some(state.task_review_iteration + 1);
        update.history.push(HistoryEntry {
            ts_ms: ctx.now_ms(),
            actor: "reviewer".to_string(),
            event: if review.approved { "task_approved".to_string() } else { "changes_requested".to_string() },
            detail: (!review.comments.is_empty()).then(|| review.comments.join("; ")),
            tokens_used: None,
        });
        update.structured_review = Some(review);
        Ok(update)
    }
}

/// Router for the edge following `reviewer`: re-run the developer with
/// comments, advance to the next task, or end if the just-reviewed task
/// was the last one. Bounded by `max_review_passes` — exhausting the
/// budget without approval still advances rather than looping forever.
pub fn route(state: &PipelineState) -> String {
    let approved = state.structured_review.as_ref().map(|r| r.approved).unwrap_or(false);
    let budget_exhausted = state.task_review_iteration >= state.max_review_passes;

    if !approved && !budget_exhausted {
        return ROUTE_DEVELOPER.to_string();
    }

    let is_last_task = state.total_tasks.map(|total| state.current_task_index + 1 >= total).unwrap_or(true);
    if is_last_task {
        ROUTE_END.to_string()
    } else {
        ROUTE_NEXT_TASK.to_string()
    }
}
