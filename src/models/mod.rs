// src/models/mod.rs

//! Domain models for the reconciliation engine.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod code;
mod config;
mod issue;
mod record;

// Re-export all public types
pub use code::{CodeAnalysis, CodeClass, PLACEHOLDER_PREFIX, UNKNOWN_PREFIX};
pub use config::{
    AlertConfig, CategoryConfig, ClassifierConfig, ClassifierStrategy, Config, LoggingConfig,
    SchedulerConfig, StoreConfig,
};
pub use issue::{Issue, IssueKind};
pub use record::{ClassifiedRecord, ITEM_ID_LEN, ListingRecord};
