//! Utility functions and helpers.

pub mod console;
pub mod http;

/// Collapse whitespace runs to single spaces and trim.
///
/// This is the canonical form of a line in the suppression store.
pub fn normalize_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
