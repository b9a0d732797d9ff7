//! Suppression store abstractions.
//!
//! The store is the only state that survives between cycles: the set of
//! issue lines that have already been alerted, one set per listing category.
//! Entries are normalized lines and are only ever appended.
//!
//! ## Directory Structure
//!
//! ```text
//! state/
//! ├── suppressed_active.txt      # one normalized line per row
//! └── suppressed_scheduled.txt
//! ```

pub mod local;
pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::utils::normalize_line;

// Re-export for convenience
pub use local::LocalSuppressionStore;
pub use memory::MemorySuppressionStore;

/// Snapshot of previously alerted lines for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressedLines {
    lines: HashSet<String>,
}

impl SuppressedLines {
    /// Build a snapshot from raw store rows, normalizing each and skipping blanks.
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = rows
            .into_iter()
            .map(|row| normalize_line(row.as_ref()))
            .filter(|row| !row.is_empty())
            .collect();
        Self { lines }
    }

    /// Whether a raw line was already alerted.
    pub fn contains(&self, raw_line: &str) -> bool {
        self.lines.contains(&normalize_line(raw_line))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Trait for suppression store backends.
#[async_trait]
pub trait SuppressionStore: Send + Sync {
    /// Load all previously alerted lines for a category.
    ///
    /// A category that was never written is an empty snapshot, not an error.
    async fn load(&self, category: &str) -> Result<SuppressedLines>;

    /// Append lines to a category. Lines are normalized before writing.
    async fn append(&self, category: &str, lines: &[String]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_normalizes_rows() {
        let snapshot = SuppressedLines::from_rows(["  a   b ", "", "   ", "c"]);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("a b"));
        assert!(snapshot.contains("a\tb  "));
        assert!(!snapshot.contains("ab"));
    }
}
