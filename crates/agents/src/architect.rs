// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Architect agent: given (issue, design, goal), produces a
//! markdown plan file on disk and a structured summary. Re-run on
//! validation failure with validator feedback appended; session continuity
//! (via `session_id`) preserves the model's prior reasoning.

use crate::error::AgentError;
use amelia_driver::{AgenticMessage, AgenticRequest, Driver};
use futures::StreamExt;
use std::path::Path;

pub struct Architect<'a> {
    driver: &'a dyn Driver,
}

pub struct ArchitectInput<'a> {
    pub issue: &'a serde_json::Value,
    pub design: Option<&'a str>,
    pub goal: &'a str,
    pub validator_feedback: Option<&'a str>,
    pub session_id: Option<&'a str>,
}

pub struct ArchitectOutput {
    pub plan_markdown: String,
    pub summary: String,
    pub session_id: Option<String>,
}

const PLAN_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["plan_markdown", "summary"],
    "properties": {
        "plan_markdown": {"type": "string"},
        "summary": {"type": "string"}
    }
}"#;

impl<'a> Architect<'a> {
    pub fn new(driver: &'a dyn Driver) -> Self {
        Self { driver }
    }

    fn build_prompt(input: &ArchitectInput<'_>) -> String {
        let mut prompt = format!(
            "Produce an implementation plan.\n\nIssue:\n{}\n\nGoal:\n{}\n",
            input.issue, input.goal
        );
        if let Some(design) = input.design {
            prompt.push_str(&format!("\nDesign notes:\n{design}\n"));
        }
        if let Some(feedback) = input.validator_feedback {
            prompt.push_str(&format!(
                "\nThe previous plan was rejected by validation. Revise it to address:\n{feedback}\n"
            ));
        }
        prompt.push_str(
            "\nRespond with a plan broken into numbered `### Task N: <title>` sections, \
             each with a short body describing the work.",
        );
        prompt
    }

    /// Run the architect, writing the produced plan to `plan_path`.
    ///
    /// Uses `execute_agentic` rather than `generate` so a revision re-run
    /// can pass `session_id` and preserve the model's prior reasoning.
    pub async fn run(&self, input: ArchitectInput<'_>, plan_path: &Path) -> Result<ArchitectOutput, AgentError> {
        let prompt = Self::build_prompt(&input);
        let schema: serde_json::Value =
            serde_json::from_str(PLAN_SCHEMA).expect("PLAN_SCHEMA is a constant valid JSON schema");
        let cwd = plan_path.parent().unwrap_or_else(|| Path::new("."));

        let mut stream = self
            .driver
            .execute_agentic(AgenticRequest {
                prompt: &prompt,
                cwd,
                session_id: input.session_id,
                instructions: None,
                schema: Some(&schema),
                allowed_tools: None,
            })
            .await?;

        let mut final_content = None;
        while let Some(message) = stream.next().await {
            if let AgenticMessage::Result { content } = message? {
                final_content = Some(content);
            }
        }
        let final_content = final_content.unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&final_content)
            .map_err(|e| amelia_driver::DriverError::SchemaValidationError(e.to_string()))?;

        let plan_markdown = value.get("plan_markdown").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let summary = value.get("summary").and_then(|v| v.as_str()).unwrap_or_default().to_string();

        if let Some(parent) = plan_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(plan_path, &plan_markdown).await?;

        Ok(ArchitectOutput { plan_markdown, summary, session_id: input.session_id.map(str::to_string) })
    }
}
