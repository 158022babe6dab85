//! Database error sanitization.
//!
//! Driver errors can carry credentials, hostnames and connection strings.
//! Only the category of failure leaves the process.

use std::fmt::Display;

pub const AUTH_FAILED: &str = "Database authentication failed. Please check your credentials.";
pub const TIMED_OUT: &str = "Database connection timed out. Please try again.";
pub const UNREACHABLE: &str = "Unable to connect to database. Please check your connection string.";
pub const UNKNOWN: &str = "An unknown database error occurred.";

/// Map a raw database error to a caller-safe message.
pub fn format_database_error<E: Display + ?Sized>(error: &E) -> String {
    let raw = error.to_string();
    let lowered = raw.to_lowercase();

    if raw.trim().is_empty() {
        UNKNOWN.to_string()
    } else if lowered.contains("password") {
        AUTH_FAILED.to_string()
    } else if lowered.contains("timeout") || lowered.contains("timed out") {
        TIMED_OUT.to_string()
    } else if lowered.contains("connection") || lowered.contains("connect") {
        UNREACHABLE.to_string()
    } else {
        format!("Database error: {raw}")
    }
}
