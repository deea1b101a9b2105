// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! amelia-agents: stateless structs wrapping a driver (or, for the Plan
//! Validator, no driver at all) that each carry out one step of the
//! implementation pipeline. Agents never touch `StateUpdate` directly;
//! they return typed outputs that the graph's nodes translate into state
//! updates, so this crate has no dependency on amelia-graph.

pub mod architect;
pub mod developer;
pub mod error;
pub mod evaluator;
pub mod oracle;
pub mod plan;
pub mod plan_validator;
pub mod reviewer;

pub use architect::{Architect, ArchitectInput, ArchitectOutput};
pub use developer::{Developer, DeveloperInput, DeveloperOutput};
pub use error::AgentError;
pub use evaluator::{Evaluator, EvaluatorInput};
pub use oracle::{Oracle, OracleInput};
pub use plan::{count_tasks, extract_task_section, parse_task_sections, TaskSection};
pub use plan_validator::{PlanValidationResult, PlanValidator, ValidationSeverity};
pub use reviewer::{Reviewer, ReviewerInput};
