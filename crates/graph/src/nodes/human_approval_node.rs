// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The declared interrupt point. The graph
//! suspends *before* this node runs whenever the scheduler hasn't already
//! resolved the interrupt via an explicit approve/reject call, so by the
//! time this node actually executes the decision has already been made —
//! it only records that the plan is now approved and clears the pending
//! flag for the developer loop to begin.

use crate::error::GraphError;
use crate::node::{Node, NodeContext};
use crate::state_update::StateUpdate;
use amelia_core::{AgenticStatus, Clock, HistoryEntry, PipelineState};
use async_trait::async_trait;

pub const ROUTE_APPROVE: &str = "approve";
pub const ROUTE_REJECT: &str = "reject";

pub struct HumanApprovalNode;

#[async_trait]
impl<C: Clock> Node<C> for HumanApprovalNode {
    fn name(&self) -> &'static str {
        "human_approval"
    }

    async fn run(&self, _state: &PipelineState, ctx: &NodeContext<C>) -> Result<StateUpdate, GraphError> {
        let mut update = StateUpdate::new();
        update.pending_user_input = Some(false);
        update.agentic_status = Some(AgenticStatus::Running);
        update.history.push(HistoryEntry {
            ts_ms: ctx.now_ms(),
            actor: "human_approval".to_string(),
            event: "plan_approved".to_string(),
            detail: None,
            tokens_used: None,
        });
        Ok(update)
    }
}

/// Router for the edge following `human_approval`. `reject` is only
/// reachable by a caller resuming with a rejection payload recorded onto
/// state before the graph continues; absent that signal the default is to
/// proceed into implementation.
pub fn route(state: &PipelineState) -> String {
    if state.workflow_status == amelia_core::WorkflowStatus::Cancelled {
        ROUTE_REJECT.to_string()
    } else {
        ROUTE_APPROVE.to_string()
    }
}
