// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::GraphError;
use crate::node::{Node, NodeContext};
use crate::state_update::StateUpdate;
use amelia_agents::{count_tasks, PlanValidator};
use amelia_core::{Clock, HistoryEntry, PipelineState};
use async_trait::async_trait;

pub const ROUTE_APPROVED: &str = "approved";
pub const ROUTE_REVISE: &str = "revise";
pub const ROUTE_ESCALATE: &str = "escalate";

pub struct PlanValidatorNode;

#[async_trait]
impl<C: Clock> Node<C> for PlanValidatorNode {
    fn name(&self) -> &'static str {
        "plan_validator"
    }

    async fn run(&self, state: &PipelineState, ctx: &NodeContext<C>) -> Result<StateUpdate, GraphError> {
        let plan_markdown = state.plan_markdown.clone().unwrap_or_default();
        let result = PlanValidator.validate(&plan_markdown);

        let mut update = StateUpdate::new();
        if result.valid {
            update.total_tasks = Some(count_tasks(&plan_markdown));
            update.plan_validation_issues = Some(Vec::new());
        } else {
            update.plan_validation_issues = Some(result.issues.clone());
            if state.plan_revision_count >= state.max_plan_revisions {
                update.interrupt_reason = Some("plan_revision_budget_exhausted".to_string());
            }
        }
        update.history.push(HistoryEntry {
            ts_ms: ctx.now_ms(),
            actor: "plan_validator".to_string(),
            event: if result.valid { "plan_approved".to_string() } else { "plan_rejected".to_string() },
            detail: (!result.issues.is_empty()).then(|| result.issues.join("; ")),
            tokens_used: None,
        });
        Ok(update)
    }
}

/// Router for the edge following `plan_validator`: `approved` continues to
/// human approval, `revise` loops back to the architect while
/// `plan_revision_count < max_plan_revisions`, `escalate` also lands on
/// human approval but with the revision budget exhausted.
pub fn route(state: &PipelineState) -> String {
    let valid = state.plan_validation_issues.as_ref().map(|issues| issues.is_empty()).unwrap_or(true);
    if valid {
        return ROUTE_APPROVED.to_string();
    }
    if state.plan_revision_count < state.max_plan_revisions {
        ROUTE_REVISE.to_string()
    } else {
        ROUTE_ESCALATE.to_string()
    }
}

pub fn route_targets(architect: &str, human_approval: &str) -> std::collections::HashMap<String, String> {
    let mut routes = std::collections::HashMap::new();
    routes.insert(ROUTE_APPROVED.to_string(), human_approval.to_string());
    routes.insert(ROUTE_REVISE.to_string(), architect.to_string());
    routes.insert(ROUTE_ESCALATE.to_string(), human_approval.to_string());
    routes
}

