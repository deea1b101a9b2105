// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod architect_node;
pub mod developer_node;
pub mod human_approval_node;
pub mod next_task_node;
pub mod plan_validator_node;
pub mod reviewer_node;

pub use architect_node::ArchitectNode;
pub use developer_node::DeveloperNode;
pub use human_approval_node::HumanApprovalNode;
pub use next_task_node::NextTaskNode;
pub use plan_validator_node::PlanValidatorNode;
pub use reviewer_node::ReviewerNode;
