// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider API driver: a thin HTTP client standing
//! in for a provider API with a deep-agent runtime. Streams NDJSON events,
//! aggregates `usage` across turns.

use crate::error::DriverError;
use crate::message::{AgenticMessage, DriverUsage};
use crate::tools::normalize_tool_name;
use crate::{AgenticRequest, Driver, GenerateRequest, GenerateResult};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct ApiDriver {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    usage: Arc<Mutex<Option<DriverUsage>>>,
}

impl ApiDriver {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            usage: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl Driver for ApiDriver {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<GenerateResult, DriverError> {
        let body = serde_json::json!({
            "prompt": request.prompt,
            "system": request.system,
            "schema": request.schema,
        });
        let response = self
            .client
            .post(format!("{}/v1/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DriverError::ModelProviderError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DriverError::ModelProviderError(format!("status {}", response.status())));
        }

        let json: serde_json::Value =
            response.json().await.map_err(|e| DriverError::ModelProviderError(e.to_string()))?;
        let session_id = json.get("session_id").and_then(|v| v.as_str()).map(str::to_string);
        let value = json.get("value").cloned().unwrap_or(serde_json::Value::Null);
        if request.schema.is_some() && value.is_null() {
            return Err(DriverError::SchemaValidationError("provider returned no value".into()));
        }
        Ok(GenerateResult { value, session_id })
    }

    async fn execute_agentic(
        &self,
        request: AgenticRequest<'_>,
    ) -> Result<BoxStream<'static, Result<AgenticMessage, DriverError>>, DriverError> {
        if request.allowed_tools.is_some() {
            return Err(DriverError::NotImplemented("allowed_tools is not supported by the API driver".into()));
        }

        let body = serde_json::json!({
            "prompt": request.prompt,
            "session_id": request.session_id,
            "instructions": request.instructions,
            "schema": request.schema,
        });
        let response = self
            .client
            .post(format!("{}/v1/agentic", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DriverError::ModelProviderError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DriverError::ModelProviderError(format!("status {}", response.status())));
        }

        let usage = self.usage.clone();
        let byte_stream = response.bytes_stream();
        let message_stream = byte_stream
            .map(|chunk| chunk.map_err(|e| DriverError::ModelProviderError(e.to_string())))
            .flat_map(|chunk| {
                let lines: Vec<Result<String, DriverError>> = match chunk {
                    Ok(bytes) => String::from_utf8_lossy(&bytes)
                        .lines()
                        .filter(|l| !l.trim().is_empty())
                        .map(|l| Ok(l.to_string()))
                        .collect(),
                    Err(e) => vec![Err(e)],
                };
                futures::stream::iter(lines)
            })
            .filter_map(move |line| {
                let usage = usage.clone();
                async move {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => return Some(Err(e)),
                    };
                    let mut message: AgenticMessage = match serde_json::from_str(&line) {
                        Ok(m) => m,
                        Err(e) => return Some(Err(DriverError::Protocol(format!("malformed event: {e}")))),
                    };
                    if let AgenticMessage::ToolCall { name, .. } | AgenticMessage::ToolResult { name, .. } =
                        &mut message
                    {
                        *name = normalize_tool_name(name);
                    }
                    if let AgenticMessage::Usage { usage: turn_usage } = message {
                        let mut guard = usage.lock();
                        match guard.as_mut() {
                            Some(total) => *total += turn_usage,
                            None => *guard = Some(turn_usage),
                        }
                        return None;
                    }
                    Some(Ok(message))
                }
            });

        Ok(Box::pin(message_stream))
    }

    async fn cleanup_session(&self, _session_id: &str) -> bool {
        true
    }

    fn get_usage(&self) -> Option<DriverUsage> {
        self.usage.lock().clone()
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
