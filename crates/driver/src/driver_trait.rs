// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform interface over CLI subprocess / provider API / container worker.

use crate::error::DriverError;
use crate::message::{AgenticMessage, DriverUsage};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::path::Path;

/// A single-turn generation request, optionally schema-constrained.
pub struct GenerateRequest<'a> {
    pub prompt: &'a str,
    pub system: Option<&'a str>,
    pub schema: Option<&'a serde_json::Value>,
}

/// Result of a single-turn `generate` call.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub value: serde_json::Value,
    pub session_id: Option<String>,
}

/// A multi-turn, tool-using, streaming agent invocation.
pub struct AgenticRequest<'a> {
    pub prompt: &'a str,
    pub cwd: &'a Path,
    pub session_id: Option<&'a str>,
    pub instructions: Option<&'a str>,
    pub schema: Option<&'a serde_json::Value>,
    pub allowed_tools: Option<&'a [String]>,
}

#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Single-turn generation; validates against `schema` when provided.
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<GenerateResult, DriverError>;

    /// Streaming, tool-using, potentially multi-turn agent invocation.
    async fn execute_agentic(
        &self,
        request: AgenticRequest<'_>,
    ) -> Result<BoxStream<'static, Result<AgenticMessage, DriverError>>, DriverError>;

    /// Releases any resources associated with a prior session. Returns
    /// whether a session was actually found and cleaned up.
    async fn cleanup_session(&self, session_id: &str) -> bool;

    /// Accumulated usage totals from the most recent call, if tracked.
    fn get_usage(&self) -> Option<DriverUsage>;
}
