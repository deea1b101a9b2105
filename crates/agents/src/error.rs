// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("driver error: {0}")]
    Driver(#[from] amelia_driver::DriverError),

    #[error("developer agent requires a plan but none is present on state")]
    MissingPlan,

    #[error("task index {index} is out of range for a plan with {total} task sections")]
    TaskIndexOutOfRange { index: u32, total: u32 },

    #[error("failed to write plan file: {0}")]
    Io(#[from] std::io::Error),
}
