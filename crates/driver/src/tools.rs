// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical tool vocabulary: every driver speaks its own
//! provider's tool names; this table maps them to and from a shared set so
//! `allowed_tools` filtering works across CLI/API/container drivers.

/// (provider name, canonical name) pairs. A flat static table rather than
/// a trait per provider; the set of tool names is small and fixed.
const CANONICAL_TOOLS: &[(&str, &str)] = &[
    ("Read", "read_file"),
    ("Write", "write_file"),
    ("Edit", "edit_file"),
    ("Bash", "run_shell_command"),
    ("Glob", "find_files"),
    ("Grep", "search_files"),
    ("WebFetch", "fetch_url"),
    ("WebSearch", "web_search"),
];

/// Provider tool name -> canonical name. Unknown names pass through unchanged.
pub fn normalize_tool_name(provider_name: &str) -> String {
    CANONICAL_TOOLS
        .iter()
        .find(|(provider, _)| *provider == provider_name)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| provider_name.to_string())
}

/// Canonical name -> provider tool name. Unknown names pass through unchanged.
pub fn denormalize_tool_name(canonical_name: &str) -> String {
    CANONICAL_TOOLS
        .iter()
        .find(|(_, canonical)| *canonical == canonical_name)
        .map(|(provider, _)| provider.to_string())
        .unwrap_or_else(|| canonical_name.to_string())
}

/// Reverse-map an `allowed_tools` canonical filter into provider names,
/// silently dropping unknown canonical names.
pub fn denormalize_allowed_tools(allowed_tools: &[String]) -> Vec<String> {
    allowed_tools
        .iter()
        .filter(|canonical| CANONICAL_TOOLS.iter().any(|(_, c)| c == canonical.as_str()))
        .map(|canonical| denormalize_tool_name(canonical))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_normalize_to_canonical_names() {
        assert_eq!(normalize_tool_name("Read"), "read_file");
        assert_eq!(normalize_tool_name("Bash"), "run_shell_command");
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(normalize_tool_name("CustomTool"), "CustomTool");
        assert_eq!(denormalize_tool_name("custom_canonical"), "custom_canonical");
    }

    #[test]
    fn denormalize_allowed_tools_drops_unknown_canonical_names() {
        let allowed = vec!["read_file".to_string(), "not_a_real_tool".to_string()];
        assert_eq!(denormalize_allowed_tools(&allowed), vec!["Read".to_string()]);
    }
}
