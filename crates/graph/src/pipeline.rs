// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles the implementation pipeline topology:
//!
//! `architect -> plan_validator -> {approved|revise|escalate} ->
//! human_approval -> {approve|reject} -> developer -> reviewer ->
//! {developer|next_task|end} -> next_task -> developer`

use crate::builder::{CompiledGraph, GraphBuilder, END};
use crate::error::GraphError;
use crate::nodes::{
    human_approval_node, plan_validator_node, reviewer_node, ArchitectNode, DeveloperNode, HumanApprovalNode,
    NextTaskNode, PlanValidatorNode, ReviewerNode,
};
use amelia_core::Clock;
use std::collections::HashMap;
use std::sync::Arc;

pub const NODE_ARCHITECT: &str = "architect";
pub const NODE_PLAN_VALIDATOR: &str = "plan_validator";
pub const NODE_HUMAN_APPROVAL: &str = "human_approval";
pub const NODE_DEVELOPER: &str = "developer";
pub const NODE_REVIEWER: &str = "reviewer";
pub const NODE_NEXT_TASK: &str = "next_task";

/// Builds the compiled implementation-pipeline graph, with
/// `human_approval` declared as the sole interrupt point.
pub fn build_implementation_graph<C: Clock + 'static>() -> Result<CompiledGraph<C>, GraphError> {
    let mut builder: GraphBuilder<C> = GraphBuilder::new();

    builder
        .add_node(Arc::new(ArchitectNode))
        .add_node(Arc::new(PlanValidatorNode))
        .add_node(Arc::new(HumanApprovalNode))
        .add_node(Arc::new(DeveloperNode))
        .add_node(Arc::new(ReviewerNode))
        .add_node(Arc::new(NextTaskNode));

    builder.add_edge(NODE_ARCHITECT, NODE_PLAN_VALIDATOR);

    builder.add_conditional_edges(
        NODE_PLAN_VALIDATOR,
        plan_validator_node::route,
        plan_validator_node::route_targets(NODE_ARCHITECT, NODE_HUMAN_APPROVAL),
    );

    builder.add_conditional_edges(NODE_HUMAN_APPROVAL, human_approval_node::route, {
        let mut routes = HashMap::new();
        routes.insert(human_approval_node::ROUTE_APPROVE.to_string(), NODE_DEVELOPER.to_string());
        routes.insert(human_approval_node::ROUTE_REJECT.to_string(), END.to_string());
        routes
    });

    builder.add_edge(NODE_DEVELOPER, NODE_REVIEWER);

    builder.add_conditional_edges(NODE_REVIEWER, reviewer_node::route, {
        let mut routes = HashMap::new();
        routes.insert(reviewer_node::ROUTE_DEVELOPER.to_string(), NODE_DEVELOPER.to_string());
        routes.insert(reviewer_node::ROUTE_NEXT_TASK.to_string(), NODE_NEXT_TASK.to_string());
        routes.insert(reviewer_node::ROUTE_END.to_string(), END.to_string());
        routes
    });

    builder.add_edge(NODE_NEXT_TASK, NODE_DEVELOPER);

    builder.set_entry_point(NODE_ARCHITECT);
    builder.interrupt_before(NODE_HUMAN_APPROVAL);

    builder.build()
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
