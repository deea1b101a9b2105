// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan markdown extraction: pulls structure out of the plan by line-scan,
//! never mutates the source document. Regex-driven, with a
//! compile-time-checked static pattern, `LazyLock`-cached.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static TASK_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^###\s*Task\s+(\d+):\s*(.*)$").expect("constant regex pattern is valid"));

/// One `### Task N: <title>` section and everything until the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSection {
    pub number: u32,
    pub title: String,
    pub body: String,
}

/// Split a plan document into its numbered task sections, in document order.
pub fn parse_task_sections(markdown: &str) -> Vec<TaskSection> {
    let headers: Vec<(usize, u32, String)> = TASK_HEADER
        .captures_iter(markdown)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number: u32 = caps.get(1)?.as_str().parse().ok()?;
            let title = caps.get(2)?.as_str().trim().to_string();
            Some((whole.start(), number, title))
        })
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, (start, number, title))| {
            let header_line_end = markdown[*start..].find('\n').map(|n| start + n + 1).unwrap_or(markdown.len());
            let end = headers.get(i + 1).map(|(next_start, _, _)| *next_start).unwrap_or(markdown.len());
            let body = markdown[header_line_end..end].trim().to_string();
            TaskSection { number: *number, title: title.clone(), body }
        })
        .collect()
}

/// The total number of `### Task N:` sections in the plan.
pub fn count_tasks(markdown: &str) -> u32 {
    TASK_HEADER.find_iter(markdown).count() as u32
}

/// Extract the section for 1-indexed task `number`, formatted with the
/// given `label` heading (e.g. "Current Task" for Developer, "Current Task
/// (k/N)" for Reviewer — callers compose the exact label).
pub fn extract_task_section(markdown: &str, number: u32, label: &str) -> Option<String> {
    let section = parse_task_sections(markdown).into_iter().find(|s| s.number == number)?;
    Some(format!("## {label}: {}\n\n{}", section.title, section.body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "\
# Plan

## Goal
Ship the thing.

### Task 1: Write the parser
Implement the tokenizer and AST.

### Task 2: Wire it up
Connect the parser to the CLI.
";

    #[test]
    fn parses_every_task_section_in_order() {
        let sections = parse_task_sections(PLAN);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].number, 1);
        assert_eq!(sections[0].title, "Write the parser");
        assert!(sections[0].body.contains("tokenizer"));
        assert_eq!(sections[1].number, 2);
    }

    #[test]
    fn count_tasks_matches_the_number_of_headers() {
        assert_eq!(count_tasks(PLAN), 2);
        assert_eq!(count_tasks("no tasks here"), 0);
    }

    #[test]
    fn extract_task_section_formats_with_the_given_label() {
        let extracted = extract_task_section(PLAN, 2, "Current Task (2/2)").unwrap();
        assert!(extracted.starts_with("## Current Task (2/2): Wire it up"));
        assert!(extracted.contains("Connect the parser"));
    }

    #[test]
    fn extract_task_section_returns_none_for_an_unknown_number() {
        assert!(extract_task_section(PLAN, 99, "Current Task").is_none());
    }
}
