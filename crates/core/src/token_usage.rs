// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent token accounting.

use crate::workflow::WorkflowId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct TokenUsageId("tku-");
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub id: TokenUsageId,
    pub workflow_id: WorkflowId,
    pub agent: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
    #[serde(default)]
    pub cost_usd: f64,
    pub duration_ms: u64,
    pub num_turns: u32,
    pub timestamp_ms: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens + self.cache_read_tokens + self.cache_creation_tokens
    }
}

/// Accumulated totals as reported by a [`crate::driver`]-shaped usage message.
///
/// `amelia-core` doesn't depend on `amelia-driver`; this is the plain data
/// the driver crate converts into/from its own `DriverUsage`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cost_usd: f64,
    pub num_turns: u32,
}

impl std::ops::AddAssign for UsageTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
        self.cache_read_tokens += rhs.cache_read_tokens;
        self.cache_creation_tokens += rhs.cache_creation_tokens;
        self.cost_usd += rhs.cost_usd;
        self.num_turns += rhs.num_turns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_totals_accumulate_across_turns() {
        let mut total = UsageTotals::default();
        total += UsageTotals { input_tokens: 100, output_tokens: 50, num_turns: 1, ..Default::default() };
        total += UsageTotals { input_tokens: 20, output_tokens: 10, num_turns: 1, ..Default::default() };
        assert_eq!(total.input_tokens, 120);
        assert_eq!(total.output_tokens, 60);
        assert_eq!(total.num_turns, 2);
    }
}
