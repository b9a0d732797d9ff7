// src/pipeline/mod.rs

//! Batch pipeline for listing reconciliation.
//!
//! - `reconcile`: Group a batch by title and by code digits
//! - `report`: Select unsuppressed issues
//! - `batch`: Run parse → classify → reconcile → filter → alert → persist
//! - `pause`: Cooperative pause between phases

pub mod batch;
pub mod pause;
pub mod reconcile;
pub mod report;

pub use batch::{
    AlertStatus, BatchOutcome, ClassCounts, Pipeline, PipelineSettings, read_input,
};
pub use pause::PauseSignal;
pub use reconcile::{
    Group, IndexBuilder, Placement, ReconcileStats, ReconciliationIndex, reconcile,
};
pub use report::{IssueReport, ReportOptions, report_issues};
