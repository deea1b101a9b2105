// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container driver: writes the prompt into
//! the sandbox, runs `worker ... agentic|generate` via
//! [`amelia_sandbox::SandboxProvider::exec_stream`], parses the same
//! JSON-line contract as [`crate::cli::CliDriver`], and removes the prompt
//! file on every exit path.

use crate::error::DriverError;
use crate::message::{AgenticMessage, DriverUsage};
use crate::tools::normalize_tool_name;
use crate::{AgenticRequest, Driver, GenerateRequest, GenerateResult};
use amelia_sandbox::{ExecCommand, ExecLine, SandboxProvider};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

pub struct ContainerDriver {
    sandbox: Arc<dyn SandboxProvider>,
    usage: Arc<Mutex<Option<DriverUsage>>>,
}

impl ContainerDriver {
    pub fn new(sandbox: Arc<dyn SandboxProvider>) -> Self {
        Self { sandbox, usage: Arc::new(Mutex::new(None)) }
    }

    fn prompt_path(cwd: &std::path::Path) -> PathBuf {
        cwd.join(format!(".amelia-prompt-{}", uuid::Uuid::new_v4()))
    }
}

/// Removes the prompt file once dropped, regardless of how the stream above
/// it was terminated (exhausted, errored, or cancelled mid-poll).
struct PromptFileGuard(PathBuf);

impl Drop for PromptFileGuard {
    fn drop(&mut self) {
        let path = self.0.clone();
        tokio::spawn(async move {
            let _ = tokio::fs::remove_file(&path).await;
        });
    }
}

#[async_trait]
impl Driver for ContainerDriver {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<GenerateResult, DriverError> {
        let command = ExecCommand::new(vec!["worker".into(), "generate".into()]).with_stdin(request.prompt);
        self.sandbox.ensure_running().await?;
        let mut stream = self.sandbox.exec_stream(command).await?;

        let mut stdout = String::new();
        while let Some(line) = stream.next().await {
            match line? {
                ExecLine::Stdout(line) => {
                    stdout.push_str(&line);
                    stdout.push('\n');
                }
                ExecLine::Stderr(line) => tracing::info!(target: "amelia_driver::container", "{line}"),
            }
        }

        let text = stdout.trim().to_string();
        let value = if request.schema.is_some() {
            serde_json::from_str(&text).map_err(|e| DriverError::SchemaValidationError(e.to_string()))?
        } else {
            serde_json::Value::String(text)
        };
        Ok(GenerateResult { value, session_id: None })
    }

    async fn execute_agentic(
        &self,
        request: AgenticRequest<'_>,
    ) -> Result<BoxStream<'static, Result<AgenticMessage, DriverError>>, DriverError> {
        self.sandbox.ensure_running().await?;

        let prompt_path = Self::prompt_path(request.cwd);
        tokio::fs::write(&prompt_path, request.prompt).await?;
        let guard = PromptFileGuard(prompt_path.clone());

        let mut args = vec!["worker".into(), "agentic".into(), "--prompt-file".into(), prompt_path.display().to_string()];
        if let Some(session_id) = request.session_id {
            args.push("--resume".into());
            args.push(session_id.to_string());
        }

        let command = ExecCommand::new(args).with_cwd(request.cwd.to_path_buf());
        let exec_stream = match self.sandbox.exec_stream(command).await {
            Ok(stream) => stream,
            Err(e) => return Err(DriverError::from(e)),
        };

        let usage = self.usage.clone();
        // `guard` lives inside this closure's captured environment, so it is
        // dropped (and removes the prompt file) whenever the returned stream
        // is dropped, whether exhausted normally or cancelled mid-poll.
        let message_stream = exec_stream.filter_map(move |line| {
            let _keepalive = &guard;
            let usage = usage.clone();
            async move {
                let line = match line {
                    Ok(ExecLine::Stdout(line)) => line,
                    Ok(ExecLine::Stderr(line)) => {
                        tracing::info!(target: "amelia_driver::container", "{line}");
                        return None;
                    }
                    Err(e) => return Some(Err(DriverError::from(e))),
                };
                let line = line.trim();
                if line.is_empty() {
                    return None;
                }
                let mut message: AgenticMessage = match serde_json::from_str(line) {
                    Ok(m) => m,
                    Err(e) => return Some(Err(DriverError::Protocol(format!("malformed line: {e}")))),
                };
                if let AgenticMessage::ToolCall { name, .. } | AgenticMessage::ToolResult { name, .. } =
                    &mut message
                {
                    *name = normalize_tool_name(name);
                }
                if let AgenticMessage::Usage { usage: turn_usage } = message {
                    *usage.lock() = Some(turn_usage);
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
#[path = "container_tests.rs"]
mod tests;
