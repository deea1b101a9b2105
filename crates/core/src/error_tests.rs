// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn only_transient_is_retryable() {
    assert!(FailureClass::Transient("timeout".into()).is_retryable());
    assert!(!FailureClass::Fatal("panic".into()).is_retryable());
    assert!(!FailureClass::Cancelled.is_retryable());
    assert!(!FailureClass::Capacity.is_retryable());
    assert!(!FailureClass::Conflict("wfl-abc".into()).is_retryable());
    assert!(!FailureClass::Content(ContentFailure::SchemaValidation("bad".into())).is_retryable());
}

#[test]
fn reason_string_is_prefixed_by_class() {
    assert_eq!(FailureClass::Cancelled.reason_string(), "cancelled");
    assert_eq!(FailureClass::Capacity.reason_string(), "capacity");
    assert_eq!(
        FailureClass::Transient("connect reset".into()).reason_string(),
        "transient:connect reset"
    );
    assert_eq!(
        FailureClass::Content(ContentFailure::PlanValidation(vec!["no tasks".into()]))
            .reason_string(),
        "content:plan:no tasks"
    );
}
