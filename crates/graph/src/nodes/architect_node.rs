// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::GraphError;
use crate::node::{Node, NodeContext};
use crate::state_update::StateUpdate;
use amelia_agents::{Architect, ArchitectInput};
use amelia_core::{Clock, HistoryEntry, PipelineState};
use async_trait::async_trait;

pub struct ArchitectNode;

#[async_trait]
impl<C: Clock> Node<C> for ArchitectNode {
    fn name(&self) -> &'static str {
        "architect"
    }

    async fn run(&self, state: &PipelineState, ctx: &NodeContext<C>) -> Result<StateUpdate, GraphError> {
        let issue = state.issue.clone().unwrap_or(serde_json::Value::Null);
        let goal = state.goal.clone().unwrap_or_default();
        let is_revision = state.plan_validation_issues.as_ref().is_some_and(|i| !i.is_empty());
        let feedback = state.plan_validation_issues.as_ref().filter(|i| !i.is_empty()).map(|issues| issues.join("\n"));

        let architect = Architect::new(ctx.driver.as_ref());
        let plan_path = ctx.repository.join(&ctx.profile.plan_output_dir).join(format!("{}.md", state.workflow_id));

        let output = architect
            .run(
                ArchitectInput {
                    issue: &issue,
                    design: state.design.as_deref(),
                    goal: &goal,
                    validator_feedback: feedback.as_deref(),
                    session_id: state.driver_session_id.as_deref(),
                },
                &plan_path,
            )
            .await?;

        let mut update = StateUpdate::new();
        update.plan_markdown = Some(output.plan_markdown);
        update.plan_path = Some(plan_path.to_string_lossy().into_owned());
        update.driver_session_id = output.session_id;
        update.plan_validation_issues = Some(Vec::new());
        if is_revision {
            update.plan_revision_count = Some(state.plan_revision_count + 1);
        }
        update.history.push(HistoryEntry {
            ts_ms: ctx.now_ms(),
            actor: "architect".to_string(),
            event: "plan_produced".to_string(),
            detail: Some(output.summary),
            tokens_used: None,
        });
        Ok(update)
    }
}
