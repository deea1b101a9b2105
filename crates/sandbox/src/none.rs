// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Passthrough provider for `SandboxConfig::mode == none`.

use crate::error::SandboxError;
use crate::provider::{ExecCommand, ExecLine, SandboxProvider};
use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Runs commands directly on the host, no isolation.
pub struct NoneSandboxProvider;

#[async_trait]
impl SandboxProvider for NoneSandboxProvider {
    async fn ensure_running(&self) -> Result<(), SandboxError> {
        Ok(())
    }

    async fn exec_stream(
        &self,
        command: ExecCommand,
    ) -> Result<BoxStream<'static, Result<ExecLine, SandboxError>>, SandboxError> {
        let [program, args @ ..] = command.cmd.as_slice() else {
            return Err(SandboxError::ExecFailed("empty command".into()));
        };
        let mut proc = Command::new(program);
        proc.args(args).envs(command.env).stdout(std::process::Stdio::piped()).stderr(std::process::Stdio::piped());
        if let Some(cwd) = &command.cwd {
            proc.current_dir(cwd);
        }
        if command.stdin.is_some() {
            proc.stdin(std::process::Stdio::piped());
        } else {
            proc.stdin(std::process::Stdio::null());
        }

        let mut child = proc.spawn().map_err(SandboxError::Io)?;

        if let Some(stdin) = command.stdin {
            use tokio::io::AsyncWriteExt;
            if let Some(mut pipe) = child.stdin.take() {
                let _ = pipe.write_all(stdin.as_bytes()).await;
            }
        }

        let stdout = child.stdout.take().ok_or_else(|| SandboxError::ExecFailed("no stdout".into()))?;
        let stderr = child.stderr.take().ok_or_else(|| SandboxError::ExecFailed("no stderr".into()))?;

        let (tx, rx) = tokio::sync::mpsc::channel(256);
        let stderr_tail = std::sync::Arc::new(tokio::sync::Mutex::new(String::new()));

        let stdout_tx = tx.clone();
        let stdout_done = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if stdout_tx.send(Ok(ExecLine::Stdout(line))).await.is_err() {
                    break;
                }
            }
        });
        let stderr_tx = tx.clone();
        let stderr_tail_writer = stderr_tail.clone();
        let stderr_done = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                stderr_tail_writer.lock().await.push_str(&line);
                stderr_tail_writer.lock().await.push('\n');
                if stderr_tx.send(Ok(ExecLine::Stderr(line))).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let status = child.wait().await;
            let _ = stdout_done.await;
            let _ = stderr_done.await;
            let exit_ok = matches!(status, Ok(s) if s.success());
            if !exit_ok {
                let tail: String = stderr_tail.lock().await.chars().take(1000).collect();
                let _ = tx.send(Err(SandboxError::ExecFailed(tail))).await;
            }
        });

        Ok(Box::pin(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }

    async fn teardown(&self) {}

    async fn health_check(&self) -> Result<(), SandboxError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn exec_stream_yields_stdout_lines() {
        let provider = NoneSandboxProvider;
        let mut stream =
            provider.exec_stream(ExecCommand::new(vec!["echo".into(), "hello".into()])).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        match first {
            ExecLine::Stdout(line) => assert_eq!(line, "hello"),
            ExecLine::Stderr(_) => panic!("expected stdout"),
        }
    }

    #[tokio::test]
    async fn exec_stream_surfaces_nonzero_exit_as_a_final_error() {
        let provider = NoneSandboxProvider;
        let cmd = ExecCommand::new(vec![
            "bash".into(),
            "-c".into(),
            "echo oops >&2; exit 3".into(),
        ]);
        let mut stream = provider.exec_stream(cmd).await.unwrap();
        let mut lines = Vec::new();
        while let Some(line) = stream.next().await {
            lines.push(line);
        }
        assert!(matches!(lines.last(), Some(Err(SandboxError::ExecFailed(msg))) if msg.contains("oops")));
    }
}
