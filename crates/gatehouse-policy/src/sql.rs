//! Statement denylist and write classification.

use crate::error::ValidationError;
use regex::{RegexSet, RegexSetBuilder};
use std::sync::LazyLock;

/// Leading keywords that make a statement a write.
pub const WRITE_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "create", "drop", "alter", "truncate", "grant", "revoke",
    "commit", "rollback",
];

/// Dangerous statement shapes. Matched case-insensitively; `.` spans newlines.
const DANGEROUS_PATTERNS: &[&str] = &[
    // A second statement doing DDL or privilege changes.
    r";\s*(drop|truncate|alter|create|grant|revoke)\b",
    // Destructive DDL as the whole statement.
    r"^\s*(drop|truncate|alter)\b",
    // Mass DELETE/UPDATE behind an always-true predicate.
    r"\b(delete|update)\b.*\bwhere\s+1\s*=\s*1\b",
    // Stored procedures that shell out or run dynamic SQL.
    r"\b(xp_cmdshell|sp_executesql)\b",
];

static DENYLIST: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSetBuilder::new(DANGEROUS_PATTERNS)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .expect("denylist patterns are valid regexes")
});

/// Check a statement against the denylist.
///
/// Best-effort only: this catches obvious destructive shapes and does not
/// parse SQL.
pub fn validate_sql_query(sql: &str) -> Result<(), ValidationError> {
    if sql.trim().is_empty() {
        return Err(ValidationError::empty_query());
    }

    if DENYLIST.is_match(sql) {
        let matched: Vec<usize> = DENYLIST.matches(sql).into_iter().collect();
        tracing::debug!(patterns = ?matched, "statement rejected by denylist");
        return Err(ValidationError::dangerous_pattern());
    }

    Ok(())
}

/// True iff the statement's first keyword is a write keyword.
pub fn is_write_operation(sql: &str) -> bool {
    let first = sql
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    WRITE_KEYWORDS.contains(&first.as_str())
}
