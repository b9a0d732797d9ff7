//! Alert rendering and delivery.
//!
//! Unsuppressed issues for one category are rendered into a single plain-text
//! message and handed to an [`AlertSink`]. Delivery is attempted once per
//! batch; sinks do not retry.

pub mod console;
pub mod webhook;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AlertConfig, Issue, IssueKind};
use crate::pipeline::IssueReport;

pub use console::ConsoleSink;
pub use webhook::WebhookSink;

/// Destination for rendered alert messages.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Sink name for logs.
    fn name(&self) -> &'static str;

    /// Deliver one message for a category.
    async fn deliver(&self, category: &str, message: &str) -> Result<()>;
}

/// Build the sink selected by configuration.
///
/// Falls back to the console when sending is disabled or no webhook is set.
pub fn sink_for(config: &AlertConfig) -> Result<Box<dyn AlertSink>> {
    match config.webhook() {
        Some(url) if config.send => Ok(Box::new(WebhookSink::new(url, config)?)),
        _ => Ok(Box::new(ConsoleSink)),
    }
}

/// Render one group issue block.
fn render_group(issue: &Issue) -> String {
    let key = issue.key.as_deref().unwrap_or_default();
    let heading = match issue.kind {
        IssueKind::DuplicateTitle => format!("{}: {}", issue.kind.label(), key),
        _ => format!("{} ({}):", issue.kind.label(), key),
    };
    render_block(heading, issue.source_lines())
}

fn render_block<'a>(heading: String, lines: impl Iterator<Item = &'a str>) -> String {
    let mut block = heading;
    for line in lines {
        block.push_str("\n  ");
        block.push_str(line);
    }
    block
}

/// Render a flat list of single-record issues under one label.
fn render_flat(kind: IssueKind, issues: &[Issue]) -> Option<String> {
    if issues.is_empty() {
        return None;
    }
    let heading = format!("{}:", kind.label());
    Some(render_block(
        heading,
        issues.iter().flat_map(|issue| issue.source_lines()),
    ))
}

/// Render the alert message for one category.
pub fn render_message(category: &str, report: &IssueReport) -> String {
    let mut blocks = vec![format!(
        "Listing issues ({}): {} new",
        category,
        report.issue_count()
    )];

    blocks.extend(report.duplicate_titles.iter().map(render_group));
    blocks.extend(report.duplicate_codes.iter().map(render_group));
    blocks.extend(render_flat(IssueKind::EmptyCode, &report.empty_codes));
    blocks.extend(render_flat(IssueKind::MalformedCode, &report.malformed_codes));

    blocks.join("\n\n")
}
