//! Reportable listing issues.

use serde::{Deserialize, Serialize};

use crate::models::ListingRecord;

/// Kind of problem an issue reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Two or more distinct item ids share a title
    DuplicateTitle,
    /// Two or more distinct item ids share a numeric code fragment
    DuplicateCodeNumber,
    /// The seller code carries no numeric id
    EmptyCode,
    /// The seller code fits no recognized shape
    MalformedCode,
}

impl IssueKind {
    /// Section label used when rendering alerts.
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::DuplicateTitle => "Duplicate Title",
            IssueKind::DuplicateCodeNumber => "Duplicate SKU Number",
            IssueKind::EmptyCode => "Empty SKU",
            IssueKind::MalformedCode => "Malformed SKU",
        }
    }
}

/// One candidate issue: a conflict group or a single bad-code record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,

    /// Group key (title or digit fragment); `None` for per-record issues
    pub key: Option<String>,

    /// Records involved, in first-seen order
    pub records: Vec<ListingRecord>,
}

impl Issue {
    /// Issue for a conflict group.
    pub fn group(kind: IssueKind, key: impl Into<String>, records: Vec<ListingRecord>) -> Self {
        Self {
            kind,
            key: Some(key.into()),
            records,
        }
    }

    /// Issue for a single record.
    pub fn single(kind: IssueKind, record: ListingRecord) -> Self {
        Self {
            kind,
            key: None,
            records: vec![record],
        }
    }

    /// Verbatim source lines of the involved records.
    pub fn source_lines(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.source_line.as_str())
    }
}
