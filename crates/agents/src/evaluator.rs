// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Evaluator agent: a single-turn structured-output call
//! judging whether the overall workflow goal has been met. No tool use, no
//! session continuity; just `generate`.

use crate::error::AgentError;
use amelia_core::EvaluationResult;
use amelia_driver::{Driver, GenerateRequest};

pub struct Evaluator<'a> {
    driver: &'a dyn Driver,
}

pub struct EvaluatorInput<'a> {
    pub goal: &'a str,
    pub final_response: Option<&'a str>,
    pub history_summary: Option<&'a str>,
}

const EVALUATION_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["verdict"],
    "properties": {
        "verdict": {"type": "string"},
        "rationale": {"type": "string"}
    }
}"#;

impl<'a> Evaluator<'a> {
    pub fn new(driver: &'a dyn Driver) -> Self {
        Self { driver }
    }

    fn build_prompt(input: &EvaluatorInput<'_>) -> String {
        let mut prompt = format!("Evaluate whether the following goal has been met:\n{}\n", input.goal);
        if let Some(response) = input.final_response {
            prompt.push_str(&format!("\nFinal response produced:\n{response}\n"));
        }
        if let Some(summary) = input.history_summary {
            prompt.push_str(&format!("\nWork performed:\n{summary}\n"));
        }
        prompt.push_str("\nRespond with a verdict and a short rationale.");
        prompt
    }

    pub async fn run(&self, input: EvaluatorInput<'_>) -> Result<EvaluationResult, AgentError> {
        let prompt = Self::build_prompt(&input);
        let schema: serde_json::Value =
            serde_json::from_str(EVALUATION_SCHEMA).expect("EVALUATION_SCHEMA is a constant valid JSON schema");

        let result = self
            .driver
            .generate(GenerateRequest { prompt: &prompt, system: None, schema: Some(&schema) })
            .await?;

        let evaluation: EvaluationResult = serde_json::from_value(result.value)
            .map_err(|e| amelia_driver::DriverError::SchemaValidationError(e.to_string()))?;
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amelia_driver::FakeDriver;

    #[tokio::test]
    async fn parses_the_verdict_and_rationale() {
        let driver = FakeDriver::new(vec![]).with_generate_result(
            serde_json::json!({"verdict": "pass", "rationale": "goal fully addressed"}),
        );
        let evaluator = Evaluator::new(&driver);

        let result = evaluator
            .run(EvaluatorInput { goal: "fix the bug", final_response: Some("fixed"), history_summary: None })
            .await
            .unwrap();

        assert_eq!(result.verdict, "pass");
        assert_eq!(result.rationale.as_deref(), Some("goal fully addressed"));
    }

    #[tokio::test]
    async fn rationale_is_optional() {
        let driver = FakeDriver::new(vec![]).with_generate_result(serde_json::json!({"verdict": "fail"}));
        let evaluator = Evaluator::new(&driver);

        let result = evaluator.run(EvaluatorInput { goal: "g", final_response: None, history_summary: None }).await.unwrap();

        assert_eq!(result.verdict, "fail");
        assert_eq!(result.rationale, None);
    }
}
