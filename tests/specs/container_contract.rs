//! Scenario 6: the container driver's JSON-line contract. A scripted
//! sandbox replays a thinking/tool_call/tool_result/result/usage sequence;
//! `ContainerDriver` must surface the first four as ordered
//! [`AgenticMessage`]s and fold the usage line into `get_usage()` instead
//! of yielding it as a message.

use amelia_driver::{AgenticMessage, ContainerDriver, Driver};
use amelia_sandbox::{ExecCommand, ExecLine, SandboxError, SandboxProvider};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;

struct ScriptedSandbox {
    lines: Vec<String>,
}

#[async_trait]
impl SandboxProvider for ScriptedSandbox {
    async fn ensure_running(&self) -> Result<(), SandboxError> {
        Ok(())
    }

    async fn exec_stream(&self, _command: ExecCommand) -> Result<BoxStream<'static, Result<ExecLine, SandboxError>>, SandboxError> {
        let lines = self.lines.clone();
        Ok(Box::pin(futures::stream::iter(lines.into_iter().map(|l| Ok(ExecLine::Stdout(l))))))
    }

    async fn teardown(&self) {}

    async fn health_check(&self) -> Result<(), SandboxError> {
        Ok(())
    }
}

#[tokio::test]
async fn execute_agentic_yields_the_scripted_messages_in_order_and_reports_usage() {
    let sandbox = ScriptedSandbox {
        lines: vec![
            serde_json::json!({"type": "thinking", "content": "planning the change"}).to_string(),
            serde_json::json!({"type": "tool_call", "name": "Read", "input": {"path": "src/lib.rs"}, "call_id": "c1"}).to_string(),
            serde_json::json!({"type": "tool_result", "name": "Read", "output": "fn main() {}", "call_id": "c1", "is_error": false}).to_string(),
            serde_json::json!({"type": "result", "content": "done"}).to_string(),
            serde_json::json!({"type": "usage", "usage": {
                "input_tokens": 100, "output_tokens": 40, "cache_read_tokens": 0,
                "cache_write_tokens": 0, "total_cost_usd": 0.02, "num_turns": 1,
            }}).to_string(),
        ],
    };

    let driver = ContainerDriver::new(Arc::new(sandbox));
    let cwd = std::env::temp_dir();
    let mut stream = driver
        .execute_agentic(amelia_driver::AgenticRequest {
            prompt: "implement the change",
            cwd: &cwd,
            session_id: None,
            instructions: None,
            schema: None,
            allowed_tools: None,
        })
        .await
        .unwrap();

    let mut messages = Vec::new();
    while let Some(message) = stream.next().await {
        messages.push(message.unwrap());
    }

    assert_eq!(
        messages,
        vec![
            AgenticMessage::Thinking { content: "planning the change".to_string() },
            AgenticMessage::ToolCall { name: "Read".to_string(), input: serde_json::json!({"path": "src/lib.rs"}), call_id: "c1".to_string() },
            AgenticMessage::ToolResult { name: "Read".to_string(), output: "fn main() {}".to_string(), call_id: "c1".to_string(), is_error: false },
            AgenticMessage::Result { content: "done".to_string() },
        ]
    );

    let usage = driver.get_usage().expect("usage line should have been folded into driver state");
    assert_eq!(usage.input_tokens, 100);
    assert_eq!(usage.output_tokens, 40);
    assert_eq!(usage.num_turns, 1);
}
