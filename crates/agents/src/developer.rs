// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Developer agent: extracts the *current* task section
//! from the full plan at prompt-building time, never mutating the stored
//! plan, and injects a task-progress breadcrumb.

use crate::error::AgentError;
use crate::plan::{extract_task_section, TaskSection};
use amelia_core::{ToolCallRecord, ToolResultRecord};
use amelia_driver::{AgenticMessage, AgenticRequest, Driver};
use futures::StreamExt;
use std::path::Path;

pub struct Developer<'a> {
    driver: &'a dyn Driver,
}

pub struct DeveloperInput<'a> {
    pub plan_markdown: Option<&'a str>,
    pub current_task_index: u32,
    pub total_tasks: Option<u32>,
    pub review_comments: &'a [String],
    pub cwd: &'a Path,
    pub session_id: Option<&'a str>,
}

pub struct DeveloperOutput {
    pub tool_calls: Vec<ToolCallRecord>,
    pub tool_results: Vec<ToolResultRecord>,
    pub final_response: Option<String>,
}

impl<'a> Developer<'a> {
    pub fn new(driver: &'a dyn Driver) -> Self {
        Self { driver }
    }

    fn build_prompt(plan_markdown: &str, task: &TaskSection, input: &DeveloperInput<'_>) -> String {
        let total = input.total_tasks.unwrap_or(task.number);
        let completed = input.current_task_index;
        let breadcrumb = format!("Tasks 1-{completed} of {total} completed; executing Task {}.", task.number);

        let current_task = extract_task_section(plan_markdown, task.number, "Current Task")
            .unwrap_or_else(|| format!("## Current Task: {}\n\n{}", task.title, task.body));

        let mut prompt = format!("{breadcrumb}\n\n{current_task}\n");
        if !input.review_comments.is_empty() {
            prompt.push_str("\nRequested changes:\n");
            for comment in input.review_comments {
                prompt.push_str(&format!("- {comment}\n"));
            }
        }
        prompt
    }

    pub async fn run(&self, input: DeveloperInput<'_>) -> Result<DeveloperOutput, AgentError> {
        let plan_markdown = input.plan_markdown.ok_or(AgentError::MissingPlan)?;
        let task_number = input.current_task_index + 1;
        let task = crate::plan::parse_task_sections(plan_markdown)
            .into_iter()
            .find(|s| s.number == task_number)
            .ok_or(AgentError::TaskIndexOutOfRange {
                index: task_number,
                total: crate::plan::count_tasks(plan_markdown),
            })?;

        let prompt = Self::build_prompt(plan_markdown, &task, &input);

        let mut stream = self
            .driver
            .execute_agentic(AgenticRequest {
                prompt: &prompt,
                cwd: input.cwd,
                session_id: input.session_id,
                instructions: None,
                schema: None,
                allowed_tools: None,
            })
            .await?;

        let mut tool_calls = Vec::new();
        let mut tool_results = Vec::new();
        let mut final_response = None;

        while let Some(message) = stream.next().await {
            match message? {
                AgenticMessage::ToolCall { name, input, call_id } => {
                    tool_calls.push(ToolCallRecord { call_id, name, input });
                }
                AgenticMessage::ToolResult { name, output, call_id, is_error } => {
                    tool_results.push(ToolResultRecord { call_id, name, output, is_error });
                }
                AgenticMessage::Result { content } => final_response = Some(content),
                AgenticMessage::Thinking { .. } | AgenticMessage::Usage { .. } => {}
            }
        }

        Ok(DeveloperOutput { tool_calls, tool_results, final_response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amelia_driver::FakeDriver;

    const PLAN: &str = "### Task 1: Write the parser\nImplement the tokenizer.\n\n### Task 2: Wire it up\nConnect it.\n";

    #[tokio::test]
    async fn fails_without_a_plan() {
        let driver = FakeDriver::new(vec![]);
        let developer = Developer::new(&driver);
        let dir = tempfile::tempdir().unwrap();
        let err = developer
            .run(DeveloperInput {
                plan_markdown: None,
                current_task_index: 0,
                total_tasks: None,
                review_comments: &[],
                cwd: dir.path(),
                session_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MissingPlan));
    }

    #[tokio::test]
    async fn collects_tool_calls_and_results_from_the_stream() {
        let driver = FakeDriver::new(vec![
            AgenticMessage::ToolCall { name: "read_file".into(), input: serde_json::json!({}), call_id: "c1".into() },
            AgenticMessage::ToolResult {
                name: "read_file".into(),
                output: "contents".into(),
                call_id: "c1".into(),
                is_error: false,
            },
            AgenticMessage::Result { content: "task done".into() },
        ]);
        let developer = Developer::new(&driver);
        let dir = tempfile::tempdir().unwrap();

        let output = developer
            .run(DeveloperInput {
                plan_markdown: Some(PLAN),
                current_task_index: 0,
                total_tasks: Some(2),
                review_comments: &[],
                cwd: dir.path(),
                session_id: None,
            })
            .await
            .unwrap();

        assert_eq!(output.tool_calls.len(), 1);
        assert_eq!(output.tool_results.len(), 1);
        assert_eq!(output.final_response.as_deref(), Some("task done"));
    }

    #[tokio::test]
    async fn out_of_range_task_index_is_an_error() {
        let driver = FakeDriver::new(vec![]);
        let developer = Developer::new(&driver);
        let dir = tempfile::tempdir().unwrap();
        let err = developer
            .run(DeveloperInput {
                plan_markdown: Some(PLAN),
                current_task_index: 9,
                total_tasks: Some(2),
                review_comments: &[],
                cwd: dir.path(),
                session_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::TaskIndexOutOfRange { .. }));
    }
}
