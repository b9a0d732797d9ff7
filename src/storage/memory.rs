//! In-process suppression store.
//!
//! Keeps rows in memory for the lifetime of the value. Useful for embedding
//! the pipeline where persistence is handled elsewhere, and for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::{SuppressedLines, SuppressionStore};
use crate::utils::normalize_line;

/// Memory-backed store.
#[derive(Debug, Default)]
pub struct MemorySuppressionStore {
    rows: Mutex<HashMap<String, Vec<String>>>,
}

impl MemorySuppressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows appended to a category so far, in append order.
    pub fn rows(&self, category: &str) -> Vec<String> {
        self.rows
            .lock()
            .map(|rows| rows.get(category).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SuppressionStore for MemorySuppressionStore {
    async fn load(&self, category: &str) -> Result<SuppressedLines> {
        let rows = self
            .rows
            .lock()
            .map_err(|e| AppError::store(category, e))?;
        Ok(SuppressedLines::from_rows(
            rows.get(category).map(Vec::as_slice).unwrap_or_default(),
        ))
    }

    async fn append(&self, category: &str, lines: &[String]) -> Result<()> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|e| AppError::store(category, e))?;
        rows.entry(category.to_string()).or_default().extend(
            lines
                .iter()
                .map(|line| normalize_line(line))
                .filter(|row| !row.is_empty()),
        );
        Ok(())
    }
}
