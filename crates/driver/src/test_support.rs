// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted driver for agent/graph unit tests: records every call it
//! receives and replays configured responses.

use crate::error::DriverError;
use crate::message::{AgenticMessage, DriverUsage};
use crate::{AgenticRequest, Driver, GenerateRequest, GenerateResult};
use async_trait::async_trait;
use futures::stream::BoxStream;
use parking_lot::Mutex;

#[derive(Debug, Clone)]
pub enum DriverCall {
    Generate { prompt: String },
    ExecuteAgentic { prompt: String, session_id: Option<String> },
}

/// Replays a fixed list of [`AgenticMessage`]s for every `execute_agentic`
/// call and a fixed value for every `generate` call, recording each call it
/// receives for assertions.
pub struct FakeDriver {
    pub generate_result: serde_json::Value,
    pub agentic_messages: Vec<AgenticMessage>,
    pub calls: Mutex<Vec<DriverCall>>,
}

impl FakeDriver {
    pub fn new(agentic_messages: Vec<AgenticMessage>) -> Self {
        Self { generate_result: serde_json::Value::Null, agentic_messages, calls: Mutex::new(Vec::new()) }
    }

    pub fn with_generate_result(mut self, value: serde_json::Value) -> Self {
        self.generate_result = value;
        self
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<GenerateResult, DriverError> {
        self.calls.lock().push(DriverCall::Generate { prompt: request.prompt.to_string() });
        Ok(GenerateResult { value: self.generate_result.clone(), session_id: None })
    }

    async fn execute_agentic(
        &self,
        request: AgenticRequest<'_>,
    ) -> Result<BoxStream<'static, Result<AgenticMessage, DriverError>>, DriverError> {
        self.calls.lock().push(DriverCall::ExecuteAgentic {
            prompt: request.prompt.to_string(),
            session_id: request.session_id.map(str::to_string),
        });
        let messages: Vec<Result<AgenticMessage, DriverError>> =
            self.agentic_messages.clone().into_iter().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(messages)))
    }

    async fn cleanup_session(&self, _session_id: &str) -> bool {
        true
    }

    fn get_usage(&self) -> Option<DriverUsage> {
        None
    }
}
