// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The streamed sum type every driver produces.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
    pub total_cost_usd: f64,
    pub num_turns: u32,
}

impl std::ops::AddAssign for DriverUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
        self.cache_read_tokens += rhs.cache_read_tokens;
        self.cache_write_tokens += rhs.cache_write_tokens;
        self.total_cost_usd += rhs.total_cost_usd;
        self.num_turns += rhs.num_turns;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgenticMessage {
    Thinking { content: String },
    ToolCall { name: String, input: serde_json::Value, call_id: String },
    ToolResult { name: String, output: String, call_id: String, is_error: bool },
    Result { content: String },
    Usage { usage: DriverUsage },
}

impl AgenticMessage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgenticMessage::Result { .. })
    }
}
