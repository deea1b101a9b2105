// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Error taxonomy for the driver layer.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Final structured output failed schema validation. Not retryable.
    #[error("schema validation failed: {0}")]
    SchemaValidationError(String),

    /// Network or provider transient fault. Retryable at a higher layer.
    #[error("model provider error: {0}")]
    ModelProviderError(String),

    /// Feature not supported by this driver (e.g. `allowed_tools` on the API driver).
    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("sandbox error: {0}")]
    Sandbox(#[from] amelia_sandbox::SandboxError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed driver output: {0}")]
    Protocol(String),
}

impl DriverError {
    /// Whether a scheduler-level retry is appropriate.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DriverError::ModelProviderError(_))
    }
}
