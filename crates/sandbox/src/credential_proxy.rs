// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-side credential proxy. Runs on the
//! host on a loopback port; the sandbox container never holds API keys.
//! Two route groups: `/llm/*` forwards provider calls with the host's
//! resolved key attached, `/git/credentials` answers git's
//! `credential-helper` protocol from the host's credential store.
//!
//! Credential resolution follows the same fallback chain the driver layer
//! uses to launch a local `claude` subprocess — env var, then the CLI's own
//! credentials file — so a containerized run authenticates identically to
//! a host run.
//!
//! ```text
//! Flow A — OAuth token (preferred):
//!   1. CLAUDE_CODE_OAUTH_TOKEN env var
//!   2. ~/.claude/.credentials.json -> claudeAiOauth.accessToken
//!
//! Flow B — API key (fallback):
//!   3. ANTHROPIC_API_KEY env var
//!   4. ~/.claude/.claude.json -> primaryApiKey
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// A resolved credential for attaching to a proxied LLM request.
#[derive(Debug, Clone)]
pub enum Credential {
    OAuthToken(String),
    ApiKey(String),
}

impl Credential {
    fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credential::OAuthToken(token) => builder.bearer_auth(token),
            Credential::ApiKey(key) => builder.header("x-api-key", key),
        }
    }
}

/// Resolve a credential from the host environment (env var, then file).
pub fn resolve() -> Option<Credential> {
    resolve_oauth().or_else(resolve_api_key)
}

fn resolve_oauth() -> Option<Credential> {
    if let Ok(token) = std::env::var("CLAUDE_CODE_OAUTH_TOKEN") {
        if !token.is_empty() {
            return Some(Credential::OAuthToken(token));
        }
    }
    let path = claude_dir()?.join(".credentials.json");
    let content = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&content).ok()?;
    value
        .get("claudeAiOauth")
        .and_then(|v| v.get("accessToken"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| Credential::OAuthToken(s.to_string()))
}

fn resolve_api_key() -> Option<Credential> {
    if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
        if !key.is_empty() {
            return Some(Credential::ApiKey(key));
        }
    }
    let path = claude_dir()?.join(".claude.json");
    let content = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&content).ok()?;
    value
        .get("primaryApiKey")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| Credential::ApiKey(s.to_string()))
}

fn claude_dir() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude"))
}

struct ProxyState {
    client: reqwest::Client,
    upstream_base: String,
}

/// Builds the credential proxy router. `upstream_base` is the provider's
/// API base (e.g. `https://api.anthropic.com`); routes below it are
/// forwarded verbatim with the resolved credential attached.
pub fn router(upstream_base: impl Into<String>) -> Router {
    let state = Arc::new(ProxyState { client: reqwest::Client::new(), upstream_base: upstream_base.into() });
    Router::new()
        .route("/llm/chat/completions", post(forward_chat))
        .route("/llm/embeddings", post(forward_embeddings))
        .route("/git/credentials", get(git_credentials))
        .with_state(state)
}

async fn forward_chat(
    State(state): State<Arc<ProxyState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    forward(&state, "/v1/chat/completions", body).await
}

async fn forward_embeddings(
    State(state): State<Arc<ProxyState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    forward(&state, "/v1/embeddings", body).await
}

async fn forward(
    state: &ProxyState,
    path: &str,
    body: serde_json::Value,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let credential = resolve().ok_or((StatusCode::SERVICE_UNAVAILABLE, "no host credential available".to_string()))?;
    let url = format!("{}{}", state.upstream_base, path);
    let request = credential.apply(state.client.post(url).json(&body));
    let response = request.send().await.map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let payload: serde_json::Value = response.json().await.map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;
    if status.is_success() {
        Ok(Json(payload))
    } else {
        Err((status, payload.to_string()))
    }
}

/// Answers git's `credential.helper` protocol by shelling out to the host's
/// own `git credential fill` — the container's helper script just forwards
/// stdin/stdout across `host.docker.internal`.
async fn git_credentials() -> Result<String, (StatusCode, String)> {
    let mut child = Command::new("git")
        .args(["credential", "fill"])
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(b"protocol=https\nhost=github.com\n\n").await;
    }

    let mut output = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        let _ = stdout.read_to_string(&mut output).await;
    }
    let _ = child.wait().await;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_credential_applies_bearer_auth() {
        let client = reqwest::Client::new();
        let credential = Credential::OAuthToken("tok-123".to_string());
        let request = credential.apply(client.get("http://localhost")).build().unwrap();
        let header = request.headers().get("authorization").unwrap();
        assert_eq!(header, "Bearer tok-123");
    }

    #[test]
    fn api_key_credential_sets_x_api_key_header() {
        let client = reqwest::Client::new();
        let credential = Credential::ApiKey("sk-ant-abc".to_string());
        let request = credential.apply(client.get("http://localhost")).build().unwrap();
        let header = request.headers().get("x-api-key").unwrap();
        assert_eq!(header, "sk-ant-abc");
    }

    #[test]
    fn credentials_json_parsing_filters_empty_tokens() {
        let value: serde_json::Value = serde_json::from_str(r#"{"claudeAiOauth": {"accessToken": ""}}"#).unwrap();
        let token = value
            .get("claudeAiOauth")
            .and_then(|v| v.get("accessToken"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty());
        assert!(token.is_none());
    }

    #[test]
    fn claude_json_parsing_extracts_primary_api_key() {
        let value: serde_json::Value = serde_json::from_str(r#"{"primaryApiKey": "sk-ant-test123"}"#).unwrap();
        let key = value.get("primaryApiKey").and_then(|v| v.as_str());
        assert_eq!(key, Some("sk-ant-test123"));
    }
}
