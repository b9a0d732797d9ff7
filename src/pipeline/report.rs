//! Issue selection against the suppression store.
//!
//! Candidates are conflict groups (two or more distinct items under one key)
//! and records whose code is Empty (or Malformed, when enabled). A candidate
//! is surfaced when at least one of its lines is missing from the store
//! snapshot taken at the start of the batch; every line of a surfaced
//! candidate is then recorded so the same text is not alerted again.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::models::{
    ClassifiedRecord, CodeAnalysis, CodeClass, Issue, IssueKind, UNKNOWN_PREFIX,
};
use crate::pipeline::reconcile::{Group, ReconciliationIndex};
use crate::storage::SuppressedLines;
use crate::utils::normalize_line;

/// Which candidates to consider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Treat Malformed codes as issues too
    pub include_malformed: bool,
}

/// Unsuppressed issues for one category and batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueReport {
    pub duplicate_titles: Vec<Issue>,
    pub duplicate_codes: Vec<Issue>,
    pub empty_codes: Vec<Issue>,
    pub malformed_codes: Vec<Issue>,

    /// Candidates dropped because all their lines were already alerted
    pub suppressed: usize,

    /// Surfaced issue lines per code prefix
    pub prefix_counts: BTreeMap<String, usize>,
}

impl IssueReport {
    pub fn is_empty(&self) -> bool {
        self.issue_count() == 0
    }

    /// Number of surfaced issues across all kinds.
    pub fn issue_count(&self) -> usize {
        self.duplicate_titles.len()
            + self.duplicate_codes.len()
            + self.empty_codes.len()
            + self.malformed_codes.len()
    }

    /// All surfaced issues in rendering order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.duplicate_titles
            .iter()
            .chain(&self.duplicate_codes)
            .chain(&self.empty_codes)
            .chain(&self.malformed_codes)
    }

    /// Normalized lines to record in the store, de-duplicated, first-seen order.
    pub fn surfaced_lines(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.issues()
            .flat_map(|issue| issue.source_lines())
            .map(normalize_line)
            .filter(|line| seen.insert(line.clone()))
            .collect()
    }
}

/// Whether any line of the candidate is new to the store.
fn is_unsuppressed<'a>(
    mut lines: impl Iterator<Item = &'a str>,
    suppressed: &SuppressedLines,
) -> bool {
    lines.any(|line| !suppressed.contains(line))
}

/// Select the unsuppressed issues of one batch.
pub fn report_issues(
    index: &ReconciliationIndex,
    records: &[ClassifiedRecord],
    suppressed: &SuppressedLines,
    options: ReportOptions,
) -> IssueReport {
    let mut report = IssueReport::default();

    let groups: [(IssueKind, Vec<(&str, &Group)>); 2] = [
        (IssueKind::DuplicateTitle, index.title_conflicts()),
        (IssueKind::DuplicateCodeNumber, index.code_conflicts()),
    ];
    for (kind, conflicts) in groups {
        for (key, group) in conflicts {
            let lines = group.members.iter().map(|m| m.source_line.as_str());
            if !is_unsuppressed(lines, suppressed) {
                report.suppressed += 1;
                continue;
            }
            let issue = Issue::group(kind, key, group.members.clone());
            match kind {
                IssueKind::DuplicateTitle => report.duplicate_titles.push(issue),
                _ => report.duplicate_codes.push(issue),
            }
        }
    }

    let mut seen_lines = HashSet::new();
    for record in records {
        let kind = match record.analysis.class {
            CodeClass::Empty => IssueKind::EmptyCode,
            CodeClass::Malformed if options.include_malformed => IssueKind::MalformedCode,
            _ => continue,
        };
        let line = &record.record.source_line;
        if !seen_lines.insert(normalize_line(line)) {
            continue;
        }
        if suppressed.contains(line) {
            report.suppressed += 1;
            continue;
        }
        let issue = Issue::single(kind, record.record.clone());
        match kind {
            IssueKind::EmptyCode => report.empty_codes.push(issue),
            _ => report.malformed_codes.push(issue),
        }
    }

    report.prefix_counts = tally_prefixes(&report, records);
    report
}

/// Count surfaced lines per code prefix, each distinct line once.
fn tally_prefixes(report: &IssueReport, records: &[ClassifiedRecord]) -> BTreeMap<String, usize> {
    let analyses: HashMap<&str, &CodeAnalysis> = records
        .iter()
        .map(|r| (r.record.source_line.as_str(), &r.analysis))
        .collect();

    let mut counts = BTreeMap::new();
    let mut seen = HashSet::new();
    for line in report.issues().flat_map(|issue| issue.source_lines()) {
        if !seen.insert(line) {
            continue;
        }
        let prefix = analyses
            .get(line)
            .map(|a| a.prefix_or_unknown())
            .unwrap_or(UNKNOWN_PREFIX);
        *counts.entry(prefix.to_string()).or_insert(0) += 1;
    }
    counts
}
