// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subprocess driver: shells out to
//! `claude` or `codex`, parses streamed JSON-per-line stdout, treats stderr
//! as engine logging, maps a non-zero exit to a provider error.

use crate::error::DriverError;
use crate::message::{AgenticMessage, DriverUsage};
use crate::tools::{denormalize_allowed_tools, normalize_tool_name};
use crate::{AgenticRequest, Driver, GenerateRequest, GenerateResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};

/// Which CLI binary to invoke and how its arguments are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliFlavor {
    Claude,
    Codex,
}

impl CliFlavor {
    fn binary(&self) -> &'static str {
        match self {
            CliFlavor::Claude => "claude",
            CliFlavor::Codex => "codex",
        }
    }
}

/// State threaded through the `stream::unfold` driving `execute_agentic`'s
/// stdout loop. Holding `child` here ties its lifetime to the stream's —
/// see the comment at its construction site.
struct ReadState {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    usage: Arc<Mutex<Option<DriverUsage>>>,
    done: bool,
}

pub struct CliDriver {
    flavor: CliFlavor,
    extra_env: HashMap<String, String>,
    usage: Arc<Mutex<Option<DriverUsage>>>,
}

impl CliDriver {
    pub fn new(flavor: CliFlavor) -> Self {
        Self { flavor, extra_env: HashMap::new(), usage: Arc::new(Mutex::new(None)) }
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.extra_env = env;
        self
    }

    fn build_command(&self, request: &AgenticRequest<'_>) -> Command {
        let mut cmd = Command::new(self.flavor.binary());
        cmd.arg("agentic").arg("--output-format").arg("stream-json").arg("--cwd").arg(request.cwd);

        if let Some(session_id) = request.session_id {
            cmd.arg("--resume").arg(session_id);
        }
        if let Some(instructions) = request.instructions {
            cmd.arg("--system-prompt").arg(instructions);
        }
        if let Some(allowed_tools) = request.allowed_tools {
            let provider_tools = denormalize_allowed_tools(allowed_tools);
            if !provider_tools.is_empty() {
                cmd.arg("--allowed-tools").arg(provider_tools.join(","));
            }
        }

        cmd.envs(&self.extra_env);
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        // The returned stream owns this child for its whole lifetime (see
        // `execute_agentic`); dropping the stream — including via the
        // orchestrator aborting the task polling it — must kill the
        // subprocess rather than leaving it running headless.
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Driver for CliDriver {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<GenerateResult, DriverError> {
        let mut cmd = Command::new(self.flavor.binary());
        cmd.arg("generate");
        if let Some(system) = request.system {
            cmd.arg("--system-prompt").arg(system);
        }
        if request.schema.is_some() {
            cmd.arg("--output-format").arg("json");
        }
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request.prompt.as_bytes()).await?;
        }
        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DriverError::ModelProviderError(stderr.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let value: serde_json::Value = if request.schema.is_some() {
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
        let mut cmd = self.build_command(&request);
        let mut child = cmd.spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            let prompt = request.prompt.to_string();
            stdin.write_all(prompt.as_bytes()).await?;
        }

        let stdout = child.stdout.take().ok_or_else(|| DriverError::Protocol("no stdout".into()))?;
        let stderr = child.stderr.take().ok_or_else(|| DriverError::Protocol("no stderr".into()))?;

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::info!(target: "amelia_driver::cli", "{line}");
            }
        });

        // `child` lives inside the unfold state, so the returned stream owns
        // it for as long as it's polled. Dropping the stream — whether it's
        // exhausted or the task polling it gets aborted — drops `child` and,
        // with `kill_on_drop(true)` set on the command, kills the subprocess
        // instead of leaving it running detached.
        let read_state = ReadState { child, lines: BufReader::new(stdout).lines(), usage: self.usage.clone(), done: false };
        let message_stream = stream::unfold(read_state, |mut state| async move {
            loop {
                if state.done {
                    return None;
                }
                match state.lines.next_line().await {
                    Ok(Some(line)) => match parse_message_line(&line) {
                        Ok(Some(AgenticMessage::Usage { usage: driver_usage })) => {
                            *state.usage.lock() = Some(driver_usage);
                            continue;
                        }
                        Ok(Some(message)) => return Some((Ok(message), state)),
                        Ok(None) => continue,
                        Err(e) => {
                            state.done = true;
                            return Some((Err(e), state));
                        }
                    },
                    Ok(None) => {
                        state.done = true;
                        return match state.child.wait().await {
                            Ok(status) if !status.success() => {
                                Some((Err(DriverError::ModelProviderError(format!("cli driver exited with {status}"))), state))
                            }
                            _ => None,
                        };
                    }
                    Err(e) => {
                        state.done = true;
                        return Some((Err(DriverError::Io(e)), state));
                    }
                }
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

/// Parses one line of the shared JSON-line wire contract into a normalized
/// [`AgenticMessage`], applying canonical tool-name normalization to
/// `tool_call`/`tool_result` variants.
fn parse_message_line(line: &str) -> Result<Option<AgenticMessage>, DriverError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let mut message: AgenticMessage =
        serde_json::from_str(line).map_err(|e| DriverError::Protocol(format!("malformed line: {e}")))?;
    if let AgenticMessage::ToolCall { name, .. } | AgenticMessage::ToolResult { name, .. } = &mut message {
        *name = normalize_tool_name(name);
    }
    Ok(Some(message))
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
