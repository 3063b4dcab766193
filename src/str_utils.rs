/// Utility functions for string processing, particularly placeholder scanning in hand-written SQL
use once_cell::sync::Lazy;
use regex::Regex;

// Regex compiled once as a lazy static for performance
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r":(\w+)").unwrap());

/// Check if a byte position in SQL is inside quotes (handles both single and double quotes).
///
/// Backslash is an ordinary character; a doubled quote (`'it''s'`) closes and
/// reopens the literal, which leaves the state unchanged.
pub fn is_in_quotes(sql: &str, pos: usize) -> bool {
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for (idx, ch) in sql.char_indices() {
        if idx >= pos {
            break;
        }
        match ch {
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            _ => {}
        }
    }

    in_single_quote || in_double_quote
}

/// Extract `:name` placeholder names from a statement, in order of first appearance.
///
/// Colons inside string literals and `::` casts are not placeholders.
pub fn extract_placeholders(statement: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let bytes = statement.as_bytes();

    for cap in PLACEHOLDER_REGEX.captures_iter(statement) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let start = whole.start();
        if start > 0 && bytes[start - 1] == b':' {
            continue;
        }
        if is_in_quotes(statement, start) {
            continue;
        }
        let name = name.as_str().to_string();
        if seen.insert(name.clone()) {
            params.push(name);
        }
    }

    params
}
