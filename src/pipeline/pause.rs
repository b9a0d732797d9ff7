//! Cooperative pause signal.
//!
//! The batch pipeline checks the signal between phases and waits while it
//! is engaged. The signal is engaged either in-process (for example by an
//! embedding application) or by the presence of a flag file on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Shared pause flag, cheap to clone.
#[derive(Debug, Clone)]
pub struct PauseSignal {
    engaged: Arc<AtomicBool>,
    flag_file: Option<PathBuf>,
    poll: Duration,
}

impl Default for PauseSignal {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl PauseSignal {
    /// Create a released signal polled at the given interval.
    pub fn new(poll: Duration) -> Self {
        Self {
            engaged: Arc::new(AtomicBool::new(false)),
            flag_file: None,
            poll,
        }
    }

    /// Also treat the existence of `path` as engaged.
    pub fn with_flag_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.flag_file = Some(path.into());
        self
    }

    pub fn flag_file(&self) -> Option<&Path> {
        self.flag_file.as_deref()
    }

    pub fn engage(&self) {
        self.engaged.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.engaged.store(false, Ordering::SeqCst);
    }

    /// Whether the signal is currently engaged.
    pub async fn is_paused(&self) -> bool {
        if self.engaged.load(Ordering::SeqCst) {
            return true;
        }
        match &self.flag_file {
            Some(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Wait until the signal is released. Returns whether any waiting happened.
    pub async fn wait_while_paused(&self, phase: &str) -> bool {
        if !self.is_paused().await {
            return false;
        }

        log::info!("Paused before {}; waiting for release", phase);
        while self.is_paused().await {
            tokio::time::sleep(self.poll).await;
        }
        log::info!("Resumed before {}", phase);
        true
    }
}
