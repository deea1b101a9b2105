// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST client for talking to a running `amelia-api` server.

use amelia_core::{Profile, ProfileId, ServerSettings, WorkflowId, WorkflowStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach amelia-api at {0}: {1}")]
    Connect(String, reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{status}: {body}")]
    Api { status: reqwest::StatusCode, body: String },
}

impl ClientError {
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, ClientError::Connect(..))
    }
}

/// Thin wrapper over `reqwest` pointed at a single amelia-api base URL.
///
/// Mirrors the request/response shape of `crates/api`'s routes directly —
/// there is no separate wire protocol to version, just the REST surface.
pub struct AmeliaClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
pub struct CreateWorkflowRequest {
    pub issue_id: String,
    pub worktree_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileId>,
    pub start: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateWorkflowResponse {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
}

impl AmeliaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build().expect("reqwest client");
        Self { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: for<'de> Deserialize<'de>>(&self, request: reqwest::RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Connect(self.base_url.clone(), e)
            } else {
                ClientError::Request(e)
            }
        })?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Api { status, body })
        }
    }

    pub async fn health(&self) -> Result<bool, ClientError> {
        let response = self.http.get(self.url("/api/health")).send().await.map_err(|e| {
            if e.is_connect() { ClientError::Connect(self.base_url.clone(), e) } else { ClientError::Request(e) }
        })?;
        Ok(response.status().is_success())
    }

    pub async fn create_workflow(&self, request: &CreateWorkflowRequest) -> Result<CreateWorkflowResponse, ClientError> {
        self.send(self.http.post(self.url("/workflows")).json(request)).await
    }

    pub async fn get_settings(&self) -> Result<ServerSettings, ClientError> {
        self.send(self.http.get(self.url("/api/settings"))).await
    }

    pub async fn update_settings(&self, settings: &ServerSettings) -> Result<ServerSettings, ClientError> {
        self.send(self.http.put(self.url("/api/settings")).json(settings)).await
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, ClientError> {
        self.send(self.http.get(self.url("/api/profiles"))).await
    }

    pub async fn activate_profile(&self, id: ProfileId) -> Result<Profile, ClientError> {
        self.send(self.http.post(self.url(&format!("/api/profiles/{id}/activate")))).await
    }
}
