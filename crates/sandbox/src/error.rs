// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("sandbox failed to start: {0}")]
    StartFailed(String),
    #[error("sandbox command failed: {0}")]
    ExecFailed(String),
    #[error("sandbox health check failed: {0}")]
    Unhealthy(String),
    #[error("docker error: {0}")]
    Docker(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no credential available for {0}")]
    NoCredential(String),
}

impl From<bollard::errors::Error> for SandboxError {
    fn from(err: bollard::errors::Error) -> Self {
        SandboxError::Docker(err.to_string())
    }
}
