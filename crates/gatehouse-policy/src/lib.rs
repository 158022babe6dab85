//! Gatehouse policy enforcement.
//!
//! Two independent checks guard every database tool call:
//!
//! 1. **Access**: [`AccessPolicy`] decides, per identity, whether the
//!    write-capable tool is exposed at all.
//! 2. **Statement gate**: [`validate_sql_query`] rejects empty input and a fixed
//!    denylist of dangerous statement shapes, and [`is_write_operation`]
//!    classifies a statement by its leading keyword.
//!
//! The statement gate is a heuristic denylist, not a SQL parser. It is
//! defense-in-depth and does not make arbitrary input injection-safe; pair it
//! with least-privilege database credentials.
//!
//! [`format_database_error`] maps raw driver errors to messages that are safe
//! to show a caller.

pub mod access;
pub mod error;
pub mod sanitize;
pub mod sql;

pub use access::{AccessLevel, AccessPolicy};
pub use error::{ValidationError, ValidationErrorKind};
pub use sanitize::format_database_error;
pub use sql::{is_write_operation, validate_sql_query, WRITE_KEYWORDS};
