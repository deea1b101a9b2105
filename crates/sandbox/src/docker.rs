// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker-backed sandbox: one container
//! per profile, started with `sleep infinity` and kept running across
//! workflows; work happens via `docker exec`.

use crate::error::SandboxError;
use crate::provider::{ExecCommand, ExecLine, SandboxProvider};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use bollard::Docker;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

const EXEC_USER: &str = "vscode";
const STDERR_TAIL_LIMIT: usize = 1000;

/// One long-lived container per profile, named `amelia-sandbox-{profile_id}`.
pub struct DockerSandboxProvider {
    docker: Docker,
    container_name: String,
    image: String,
    network_allowlist_enabled: bool,
    network_allowed_hosts: Vec<String>,
}

impl DockerSandboxProvider {
    pub fn connect(
        profile_id: impl std::fmt::Display,
        image: impl Into<String>,
        network_allowlist_enabled: bool,
        network_allowed_hosts: Vec<String>,
    ) -> Result<Self, SandboxError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| SandboxError::StartFailed(format!("docker connect failed: {e}")))?;
        Ok(Self {
            docker,
            container_name: format!("amelia-sandbox-{profile_id}"),
            image: image.into(),
            network_allowlist_enabled,
            network_allowed_hosts,
        })
    }

    async fn image_present(&self) -> bool {
        self.docker.inspect_image(&self.image).await.is_ok()
    }

    async fn pull_image(&self) -> Result<(), SandboxError> {
        let options = CreateImageOptions { from_image: self.image.as_str(), ..Default::default() };
        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(progress) = stream.next().await {
            progress.map_err(|e| SandboxError::StartFailed(format!("image pull failed: {e}")))?;
        }
        Ok(())
    }

    async fn container_running(&self) -> bool {
        match self.docker.inspect_container(&self.container_name, None).await {
            Ok(inspect) => inspect.state.and_then(|s| s.running).unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn create_and_start(&self) -> Result<(), SandboxError> {
        let host_config = HostConfig {
            cap_add: Some(vec!["NET_ADMIN".to_string(), "NET_RAW".to_string()]),
            ..Default::default()
        };
        let config = Config {
            image: Some(self.image.clone()),
            cmd: Some(vec!["sleep".to_string(), "infinity".to_string()]),
            host_config: Some(host_config),
            ..Default::default()
        };
        let options = CreateContainerOptions { name: self.container_name.clone(), platform: None };
        match self.docker.create_container(Some(options), config).await {
            Ok(_) => {}
            Err(bollard::errors::Error::DockerResponseServerError { status_code: 409, .. }) => {}
            Err(e) => return Err(SandboxError::StartFailed(format!("container create failed: {e}"))),
        }
        self.docker
            .start_container(&self.container_name, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| SandboxError::StartFailed(format!("container start failed: {e}")))?;

        if self.network_allowlist_enabled {
            self.apply_network_allowlist().await?;
        }
        Ok(())
    }

    async fn apply_network_allowlist(&self) -> Result<(), SandboxError> {
        let script = crate::allowlist::iptables_script(&self.network_allowed_hosts);
        let mut stream = self.exec_stream(ExecCommand::new(vec!["bash".into(), "-c".into(), script])).await?;
        while let Some(line) = stream.next().await {
            line?;
        }
        Ok(())
    }
}

#[async_trait]
impl SandboxProvider for DockerSandboxProvider {
    async fn ensure_running(&self) -> Result<(), SandboxError> {
        if !self.image_present().await {
            self.pull_image().await?;
        }
        if !self.container_running().await {
            self.create_and_start().await?;
        }
        self.health_check().await
    }

    async fn exec_stream(
        &self,
        command: ExecCommand,
    ) -> Result<BoxStream<'static, Result<ExecLine, SandboxError>>, SandboxError> {
        let exec_options = CreateExecOptions {
            cmd: Some(command.cmd.clone()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            attach_stdin: Some(command.stdin.is_some()),
            user: Some(EXEC_USER.to_string()),
            working_dir: command.cwd.as_ref().map(|p| p.display().to_string()),
            env: Some(command.env.iter().map(|(k, v)| format!("{k}={v}")).collect()),
            ..Default::default()
        };
        let exec = self.docker.create_exec(&self.container_name, exec_options).await?;
        let exec_id = exec.id;

        let started = self.docker.start_exec(&exec_id, None).await?;
        let StartExecResults::Attached { mut output, mut input } = started else {
            return Err(SandboxError::ExecFailed("exec started detached".to_string()));
        };

        if let Some(stdin) = command.stdin {
            input.write_all(stdin.as_bytes()).await.map_err(SandboxError::Io)?;
            input.shutdown().await.map_err(SandboxError::Io)?;
        }
        drop(input);

        let (tx, rx) = tokio::sync::mpsc::channel(256);
        let docker = self.docker.clone();
        tokio::spawn(async move {
            let mut stderr_tail = String::new();
            while let Some(chunk) = output.next().await {
                let line = match chunk {
                    Ok(bollard::container::LogOutput::StdOut { message }) => {
                        ExecLine::Stdout(String::from_utf8_lossy(&message).trim_end_matches('\n').to_string())
                    }
                    Ok(bollard::container::LogOutput::StdErr { message }) => {
                        let text = String::from_utf8_lossy(&message).trim_end_matches('\n').to_string();
                        stderr_tail.push_str(&text);
                        stderr_tail.push('\n');
                        ExecLine::Stderr(text)
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = tx.send(Err(SandboxError::ExecFailed(e.to_string()))).await;
                        return;
                    }
                };
                if tx.send(Ok(line)).await.is_err() {
                    return;
                }
            }

            let exit_code = docker.inspect_exec(&exec_id).await.ok().and_then(|i| i.exit_code);
            if let Some(code) = exit_code {
                if code != 0 {
                    let tail: String = stderr_tail.chars().take(STDERR_TAIL_LIMIT).collect();
                    let _ = tx.send(Err(SandboxError::ExecFailed(tail))).await;
                }
            }
        });

        Ok(Box::pin(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }

    async fn teardown(&self) {
        if let Err(e) = self.docker.stop_container(&self.container_name, None).await {
            tracing::warn!(container = %self.container_name, error = %e, "sandbox container stop failed during teardown");
        }
        let options = RemoveContainerOptions { force: true, ..Default::default() };
        if let Err(e) = self.docker.remove_container(&self.container_name, Some(options)).await {
            tracing::warn!(container = %self.container_name, error = %e, "sandbox container remove failed during teardown");
        }
    }

    async fn health_check(&self) -> Result<(), SandboxError> {
        for attempt in 0..20u32 {
            if self.container_running().await {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt + 1).min(5))).await;
        }
        Err(SandboxError::Unhealthy(format!("{} never reported running", self.container_name)))
    }
}
