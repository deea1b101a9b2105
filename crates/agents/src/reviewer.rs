// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Reviewer agent: looks at the current task's diff and
//! verdicts it as approved or requesting changes, with comments threaded
//! back into the next Developer prompt.

use crate::error::AgentError;
use crate::plan::parse_task_sections;
use amelia_core::StructuredReview;
use amelia_driver::{AgenticMessage, AgenticRequest, Driver};
use futures::StreamExt;
use std::path::Path;

pub struct Reviewer<'a> {
    driver: &'a dyn Driver,
}

pub struct ReviewerInput<'a> {
    pub plan_markdown: Option<&'a str>,
    pub current_task_index: u32,
    pub total_tasks: Option<u32>,
    pub final_response: Option<&'a str>,
    pub cwd: &'a Path,
    pub session_id: Option<&'a str>,
}

const REVIEW_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["approved"],
    "properties": {
        "approved": {"type": "boolean"},
        "comments": {"type": "array", "items": {"type": "string"}}
    }
}"#;

impl<'a> Reviewer<'a> {
    pub fn new(driver: &'a dyn Driver) -> Self {
        Self { driver }
    }

    fn build_prompt(input: &ReviewerInput<'_>, task_title: &str, task_number: u32) -> String {
        let total = input.total_tasks.unwrap_or(task_number);
        let mut prompt = format!(
            "Review the work just produced for Current Task ({task_number}/{total}): {task_title}\n"
        );
        if let Some(response) = input.final_response {
            prompt.push_str(&format!("\nDeveloper's report:\n{response}\n"));
        }
        prompt.push_str(
            "\nRespond with whether the task is approved as complete, and if not, the \
             specific changes required.",
        );
        prompt
    }

    pub async fn run(&self, input: ReviewerInput<'_>) -> Result<StructuredReview, AgentError> {
        let plan_markdown = input.plan_markdown.ok_or(AgentError::MissingPlan)?;
        let task_number = input.current_task_index + 1;
        let task = parse_task_sections(plan_markdown)
            .into_iter()
            .find(|s| s.number == task_number)
            .ok_or(AgentError::TaskIndexOutOfRange {
                index: task_number,
                total: crate::plan::count_tasks(plan_markdown),
            })?;

        let prompt = Self::build_prompt(&input, &task.title, task_number);
        let schema: serde_json::Value =
            serde_json::from_str(REVIEW_SCHEMA).expect("REVIEW_SCHEMA is a constant valid JSON schema");

        let mut stream = self
            .driver
            .execute_agentic(AgenticRequest {
                prompt: &prompt,
                cwd: input.cwd,
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
        let review: StructuredReview = serde_json::from_str(&final_content)
            .map_err(|e| amelia_driver::DriverError::SchemaValidationError(e.to_string()))?;
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amelia_driver::FakeDriver;

    const PLAN: &str = "### Task 1: Write the parser\nImplement the tokenizer.\n";

    #[tokio::test]
    async fn parses_an_approved_review() {
        let content = serde_json::json!({"approved": true, "comments": []}).to_string();
        let driver = FakeDriver::new(vec![AgenticMessage::Result { content }]);
        let reviewer = Reviewer::new(&driver);
        let dir = tempfile::tempdir().unwrap();

        let review = reviewer
            .run(ReviewerInput {
                plan_markdown: Some(PLAN),
                current_task_index: 0,
                total_tasks: Some(1),
                final_response: Some("done"),
                cwd: dir.path(),
                session_id: None,
            })
            .await
            .unwrap();

        assert!(review.approved);
        assert!(review.comments.is_empty());
    }

    #[tokio::test]
    async fn parses_requested_changes() {
        let content = serde_json::json!({"approved": false, "comments": ["add a test"]}).to_string();
        let driver = FakeDriver::new(vec![AgenticMessage::Result { content }]);
        let reviewer = Reviewer::new(&driver);
        let dir = tempfile::tempdir().unwrap();

        let review = reviewer
            .run(ReviewerInput {
                plan_markdown: Some(PLAN),
                current_task_index: 0,
                total_tasks: Some(1),
                final_response: Some("done"),
                cwd: dir.path(),
                session_id: None,
            })
            .await
            .unwrap();

        assert!(!review.approved);
        assert_eq!(review.comments, vec!["add a test".to_string()]);
    }

    #[tokio::test]
    async fn fails_without_a_plan() {
        let driver = FakeDriver::new(vec![]);
        let reviewer = Reviewer::new(&driver);
        let dir = tempfile::tempdir().unwrap();
        let err = reviewer
            .run(ReviewerInput {
                plan_markdown: None,
                current_task_index: 0,
                total_tasks: None,
                final_response: None,
                cwd: dir.path(),
                session_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MissingPlan));
    }
}
