//! Validation error types for the statement gate.

use std::fmt;

/// Error type for statement validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The kind of validation error.
    pub kind: ValidationErrorKind,
    /// Human-readable error message, safe to return to the caller.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The statement was empty or whitespace only.
    pub fn empty_query() -> Self {
        Self::new(ValidationErrorKind::EmptyQuery, "SQL query cannot be empty")
    }

    /// The statement matched the denylist.
    pub fn dangerous_pattern() -> Self {
        Self::new(
            ValidationErrorKind::DangerousPattern,
            "Query contains potentially dangerous SQL patterns",
        )
    }

    /// A write statement reached the read-only tool.
    pub fn write_not_allowed(tool: &str) -> Self {
        Self::new(
            ValidationErrorKind::WriteNotAllowed,
            format!(
                "Write operations are not allowed with {tool}. \
                 Use executeDatabase if your account has write access."
            ),
        )
    }

    /// The identity is not on the privileged allow-list.
    pub fn not_privileged(login: &str) -> Self {
        Self::new(
            ValidationErrorKind::NotPrivileged,
            format!("User '{login}' is not allowed to run write operations"),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    EmptyQuery,
    DangerousPattern,
    WriteNotAllowed,
    NotPrivileged,
}
