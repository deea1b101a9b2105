// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Oracle agent: an out-of-core consultation for when an
//! agent is stuck, given a problem statement and a bundle of file context.
//! Takes `now_ms` from the caller rather than sampling time itself, matching
//! the `Clock`-injection style used by the sequencer and store.

use crate::error::AgentError;
use amelia_core::OracleConsultation;
use amelia_driver::{Driver, GenerateRequest};

pub struct Oracle<'a> {
    driver: &'a dyn Driver,
}

pub struct OracleInput<'a> {
    pub problem: &'a str,
    pub file_context: &'a [(String, String)],
    pub now_ms: u64,
}

impl<'a> Oracle<'a> {
    pub fn new(driver: &'a dyn Driver) -> Self {
        Self { driver }
    }

    fn build_prompt(input: &OracleInput<'_>) -> String {
        let mut prompt = format!("An agent is stuck on the following problem:\n{}\n", input.problem);
        if !input.file_context.is_empty() {
            prompt.push_str("\nRelevant files:\n");
            for (path, contents) in input.file_context {
                prompt.push_str(&format!("\n--- {path} ---\n{contents}\n"));
            }
        }
        prompt.push_str("\nProvide expert advice on how to proceed.");
        prompt
    }

    pub async fn run(&self, input: OracleInput<'_>) -> Result<OracleConsultation, AgentError> {
        let prompt = Self::build_prompt(&input);
        let result = self.driver.generate(GenerateRequest { prompt: &prompt, system: None, schema: None }).await?;

        let advice = match result.value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };

        Ok(OracleConsultation { problem: input.problem.to_string(), advice, ts_ms: input.now_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amelia_driver::FakeDriver;

    #[tokio::test]
    async fn records_the_problem_and_the_timestamp_supplied_by_the_caller() {
        let driver = FakeDriver::new(vec![]).with_generate_result(serde_json::json!("try reverting the last commit"));
        let oracle = Oracle::new(&driver);

        let consultation = oracle
            .run(OracleInput { problem: "tests keep failing", file_context: &[], now_ms: 42_000 })
            .await
            .unwrap();

        assert_eq!(consultation.problem, "tests keep failing");
        assert_eq!(consultation.advice, "try reverting the last commit");
        assert_eq!(consultation.ts_ms, 42_000);
    }

    #[tokio::test]
    async fn includes_file_context_in_the_prompt() {
        let input = OracleInput {
            problem: "p",
            file_context: &[("src/lib.rs".to_string(), "fn main() {}".to_string())],
            now_ms: 0,
        };
        let prompt = Oracle::build_prompt(&input);
        assert!(prompt.contains("src/lib.rs"));
        assert!(prompt.contains("fn main()"));
    }
}
