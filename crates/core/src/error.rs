// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared across every crate boundary.
//!
//! Each crate defines its own `thiserror` enum for its own failure modes;
//! this module defines the classification that the scheduler uses to decide
//! whether a failure is retried, escalated, or terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a failure should be handled by the scheduler.
///
/// Only `Transient` is ever retried. Every other variant is terminal for
/// the attempt that produced it (though `Content` failures may still route
/// through a graph's own revision loop before the workflow as a whole is
/// terminal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureClass {
    /// Bad input from a caller: invalid arguments, unknown profile, path
    /// outside the profile root. Surfaces as 4xx / non-zero CLI exit.
    User(String),
    /// A second workflow was admitted for a worktree that already has one
    /// active. Carries the id of the existing workflow.
    Conflict(String),
    /// The scheduler is at `max_concurrent`. Not a workflow failure.
    Capacity,
    /// Network/provider/subprocess I/O fault that may succeed on retry.
    Transient(String),
    /// A content-level failure: a schema-validated output didn't parse, or
    /// a plan failed structural validation. Never retried at the driver
    /// level — routed through the graph's own conditional edges instead.
    Content(ContentFailure),
    /// An unhandled programming fault. Terminal, not retried.
    Fatal(String),
    /// The workflow was cancelled by an explicit request. Terminal.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentFailure {
    SchemaValidation(String),
    PlanValidation(Vec<String>),
}

impl FailureClass {
    /// Whether the scheduler should retry the attempt that produced this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureClass::Transient(_))
    }

    /// The `failure_reason` string recorded on the workflow.
    pub fn reason_string(&self) -> String {
        match self {
            FailureClass::User(msg) => format!("user:{msg}"),
            FailureClass::Conflict(id) => format!("conflict:{id}"),
            FailureClass::Capacity => "capacity".to_string(),
            FailureClass::Transient(cause) => format!("transient:{cause}"),
            FailureClass::Content(ContentFailure::SchemaValidation(msg)) => {
                format!("content:schema:{msg}")
            }
            FailureClass::Content(ContentFailure::PlanValidation(issues)) => {
                format!("content:plan:{}", issues.join("; "))
            }
            FailureClass::Fatal(msg) => format!("fatal:{msg}"),
            FailureClass::Cancelled => "cancelled".to_string(),
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
