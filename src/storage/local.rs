//! Local filesystem suppression store.
//!
//! One UTF-8 text file per category, one normalized line per row,
//! newline-terminated, no header. A missing file is an empty store.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── suppressed_{category}.txt
//! ```
//!
//! Appends open the file in append mode; nothing else rewrites it except
//! [`LocalSuppressionStore::consolidate`], which writes a superset of the
//! current rows through a temp file and rename.

use std::collections::BTreeSet;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::error::{AppError, Result};
use crate::storage::{SuppressedLines, SuppressionStore};
use crate::utils::normalize_line;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalSuppressionStore {
    root_dir: PathBuf,
}

impl LocalSuppressionStore {
    /// Create a new store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// File backing a category.
    pub fn path_for(&self, category: &str) -> PathBuf {
        self.root_dir.join(format!("suppressed_{category}.txt"))
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Read a file's rows, returning None if it doesn't exist.
    async fn read_rows(path: &Path) -> Result<Option<Vec<String>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                Ok(Some(text.lines().map(str::to_string).collect()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Whether a non-empty file lacks a trailing newline.
    async fn has_unterminated_row(path: &Path) -> Result<bool> {
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(AppError::Io(e)),
        };
        if file.metadata().await?.len() == 0 {
            return Ok(false);
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).await?;
        file.read_exact(&mut last).await?;
        Ok(last[0] != b'\n')
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        Self::ensure_dir(path).await?;

        let tmp = path.with_extension("txt.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Merge a category's file with legacy files, de-duplicate, sort and
    /// rewrite it atomically.
    ///
    /// Missing legacy files are skipped. Returns the number of rows written.
    pub async fn consolidate(&self, category: &str, legacy: &[PathBuf]) -> Result<usize> {
        let target = self.path_for(category);
        let mut merged = BTreeSet::new();

        let sources = std::iter::once(&target).chain(legacy.iter());
        for source in sources {
            match Self::read_rows(source).await? {
                Some(rows) => {
                    let before = merged.len();
                    merged.extend(
                        rows.iter()
                            .map(|row| normalize_line(row))
                            .filter(|row| !row.is_empty()),
                    );
                    log::debug!(
                        "Merged {} new row(s) from {}",
                        merged.len() - before,
                        source.display()
                    );
                }
                None => log::warn!("Skipping missing store file {}", source.display()),
            }
        }

        if merged.is_empty() {
            log::info!("No suppression entries for {category}; leaving store unchanged");
            return Ok(0);
        }

        let mut body = merged.iter().cloned().collect::<Vec<_>>().join("\n");
        body.push('\n');
        Self::write_atomic(&target, body.as_bytes()).await?;

        log::info!(
            "Consolidated {} into {} with {} unique rows",
            category,
            target.display(),
            merged.len()
        );
        Ok(merged.len())
    }
}

#[async_trait]
impl SuppressionStore for LocalSuppressionStore {
    async fn load(&self, category: &str) -> Result<SuppressedLines> {
        let path = self.path_for(category);
        match Self::read_rows(&path).await? {
            Some(rows) => {
                let snapshot = SuppressedLines::from_rows(rows);
                log::debug!("Loaded {} suppressed line(s) from {}", snapshot.len(), path.display());
                Ok(snapshot)
            }
            None => {
                log::info!("No suppression file at {}; starting empty", path.display());
                Ok(SuppressedLines::default())
            }
        }
    }

    async fn append(&self, category: &str, lines: &[String]) -> Result<()> {
        let rows: Vec<String> = lines
            .iter()
            .map(|line| normalize_line(line))
            .filter(|row| !row.is_empty())
            .collect();
        if rows.is_empty() {
            return Ok(());
        }

        let path = self.path_for(category);
        Self::ensure_dir(&path).await?;

        let mut body = String::new();
        if Self::has_unterminated_row(&path).await? {
            log::warn!("{} does not end with a newline; terminating last row", path.display());
            body.push('\n');
        }
        body.push_str(&rows.join("\n"));
        body.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(body.as_bytes()).await?;
        file.flush().await?;

        log::debug!("Appended {} row(s) to {}", rows.len(), path.display());
        Ok(())
    }
}
