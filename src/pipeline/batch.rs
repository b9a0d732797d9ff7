// src/pipeline/batch.rs

//! One reconciliation batch per category.
//!
//! A batch runs parse → classify → reconcile → filter → alert → persist,
//! checking the pause signal between phases. Nothing in a batch is fatal:
//! store read failures degrade to an empty snapshot, dispatch failures are
//! recorded, and appends get a bounded retry.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::alert::{AlertSink, ConsoleSink, render_message, sink_for};
use crate::error::Result;
use crate::models::{CategoryConfig, ClassifiedRecord, CodeClass, Config};
use crate::pipeline::pause::PauseSignal;
use crate::pipeline::reconcile::{IndexBuilder, ReconcileStats};
use crate::pipeline::report::{ReportOptions, report_issues};
use crate::services::{CodeClassifier, classifier_for, parse_lines};
use crate::storage::{LocalSuppressionStore, SuppressedLines, SuppressionStore};

/// Tunables for a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Store append attempts per batch (at least one)
    pub append_attempts: u32,
    pub retry_delay: Duration,
    pub report_malformed: bool,
    /// Record surfaced lines in the store; off for dry runs
    pub persist: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            append_attempts: 3,
            retry_delay: Duration::from_millis(250),
            report_malformed: false,
            persist: true,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            append_attempts: config.store.append_attempts,
            retry_delay: config.store.retry_delay(),
            report_malformed: config.alert.report_malformed,
            persist: true,
        }
    }
}

/// Classification tallies for one batch.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ClassCounts {
    pub valid: usize,
    pub empty: usize,
    pub malformed: usize,
}

impl ClassCounts {
    fn add(&mut self, class: CodeClass) {
        match class {
            CodeClass::Valid => self.valid += 1,
            CodeClass::Empty => self.empty += 1,
            CodeClass::Malformed => self.malformed += 1,
        }
    }
}

/// What happened to the alert of a batch.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum AlertStatus {
    /// Nothing unsuppressed to report
    #[default]
    NotNeeded,
    Delivered,
    Failed(String),
}

/// Summary of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub category: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,

    pub lines_read: usize,
    pub blank_lines: usize,
    pub parse_failures: usize,
    pub warnings: usize,
    pub classes: ClassCounts,
    pub reconcile: ReconcileStats,

    pub title_conflicts: usize,
    pub code_conflicts: usize,

    /// Issues included in the alert
    pub surfaced: usize,
    /// Candidates whose lines were all alerted before
    pub suppressed: usize,
    pub prefix_counts: BTreeMap<String, usize>,

    pub alert: AlertStatus,
    /// Rendered alert, if one was produced
    pub message: Option<String>,

    pub persisted_lines: usize,
    pub persist_error: Option<String>,
    pub store_load_failed: bool,
}

impl BatchOutcome {
    fn start(category: &str, lines_read: usize) -> Self {
        let now = Local::now();
        Self {
            category: category.to_string(),
            started_at: now,
            finished_at: now,
            lines_read,
            blank_lines: 0,
            parse_failures: 0,
            warnings: 0,
            classes: ClassCounts::default(),
            reconcile: ReconcileStats::default(),
            title_conflicts: 0,
            code_conflicts: 0,
            surfaced: 0,
            suppressed: 0,
            prefix_counts: BTreeMap::new(),
            alert: AlertStatus::NotNeeded,
            message: None,
            persisted_lines: 0,
            persist_error: None,
            store_load_failed: false,
        }
    }

    /// Summary rows for console output.
    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        let alert = match &self.alert {
            AlertStatus::NotNeeded => "not needed".to_string(),
            AlertStatus::Delivered => "delivered".to_string(),
            AlertStatus::Failed(e) => format!("failed: {e}"),
        };
        let prefixes = self
            .prefix_counts
            .iter()
            .map(|(prefix, count)| format!("{prefix}={count}"))
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            ("Lines", self.lines_read.to_string()),
            ("Records", self.reconcile.records.to_string()),
            ("Parse failures", self.parse_failures.to_string()),
            (
                "Valid / Empty / Malformed",
                format!(
                    "{} / {} / {}",
                    self.classes.valid, self.classes.empty, self.classes.malformed
                ),
            ),
            ("Title conflicts", self.title_conflicts.to_string()),
            ("Code conflicts", self.code_conflicts.to_string()),
            ("New issues", self.surfaced.to_string()),
            ("Suppressed", self.suppressed.to_string()),
            ("By prefix", if prefixes.is_empty() { "-".to_string() } else { prefixes }),
            ("Alert", alert),
            ("Recorded lines", self.persisted_lines.to_string()),
        ]
    }
}

/// Batch pipeline wired to its collaborators.
pub struct Pipeline {
    classifier: Box<dyn CodeClassifier>,
    store: Arc<dyn SuppressionStore>,
    sink: Arc<dyn AlertSink>,
    pause: PauseSignal,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        classifier: Box<dyn CodeClassifier>,
        store: Arc<dyn SuppressionStore>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            classifier,
            store,
            sink,
            pause: PauseSignal::default(),
            settings: PipelineSettings::default(),
        }
    }

    /// Build a pipeline from configuration: local store, configured sink.
    ///
    /// A dry run prints alerts to the console and leaves the store untouched.
    pub fn from_config(config: &Config, dry_run: bool) -> Result<Self> {
        let store = Arc::new(LocalSuppressionStore::new(&config.store.dir));
        let sink: Arc<dyn AlertSink> = if dry_run {
            Arc::new(ConsoleSink)
        } else {
            Arc::from(sink_for(&config.alert)?)
        };

        let mut pause = PauseSignal::new(config.scheduler.pause_poll());
        if let Some(flag) = &config.scheduler.pause_file {
            pause = pause.with_flag_file(flag);
        }

        let mut settings = PipelineSettings::from_config(config);
        settings.persist = !dry_run;

        let classifier = classifier_for(config.classifier.strategy);
        log::debug!(
            "Pipeline: classifier={}, sink={}, persist={}",
            classifier.name(),
            sink.name(),
            settings.persist
        );

        Ok(Self::new(classifier, store, sink)
            .with_pause(pause)
            .with_settings(settings))
    }

    pub fn with_pause(mut self, pause: PauseSignal) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn pause_signal(&self) -> &PauseSignal {
        &self.pause
    }

    /// Run one batch for a category over the captured lines.
    pub async fn run_batch<S>(&self, category: &str, lines: &[S]) -> BatchOutcome
    where
        S: AsRef<str> + Sync,
    {
        let mut outcome = BatchOutcome::start(category, lines.len());
        log::info!("Batch {}: {} lines", category, lines.len());

        // Parse
        self.pause.wait_while_paused("parse").await;
        let parsed = parse_lines(lines);
        outcome.blank_lines = parsed.blank_lines;
        outcome.parse_failures = parsed.failures.len();
        outcome.warnings = parsed.warnings.len();

        // Classify
        self.pause.wait_while_paused("classify").await;
        let records: Vec<ClassifiedRecord> = parsed
            .records
            .into_iter()
            .map(|record| {
                let analysis = self.classifier.analyze(&record.code);
                outcome.classes.add(analysis.class);
                ClassifiedRecord::new(record, analysis)
            })
            .collect();

        // Reconcile
        self.pause.wait_while_paused("reconcile").await;
        let mut builder = IndexBuilder::new();
        for record in &records {
            builder.add_record(record);
        }
        let (index, stats) = builder.build();
        outcome.reconcile = stats;
        outcome.title_conflicts = index.title_conflicts().len();
        outcome.code_conflicts = index.code_conflicts().len();

        // Filter
        self.pause.wait_while_paused("filter").await;
        let suppressed = match self.store.load(category).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Could not load suppression store for {}: {}", category, e);
                outcome.store_load_failed = true;
                SuppressedLines::default()
            }
        };
        let options = ReportOptions {
            include_malformed: self.settings.report_malformed,
        };
        let report = report_issues(&index, &records, &suppressed, options);
        outcome.surfaced = report.issue_count();
        outcome.suppressed = report.suppressed;
        outcome.prefix_counts = report.prefix_counts.clone();

        if report.is_empty() {
            log::info!("Batch {}: no new issues", category);
            outcome.finished_at = Local::now();
            return outcome;
        }

        // Alert
        self.pause.wait_while_paused("alert").await;
        let message = render_message(category, &report);
        outcome.alert = match self.sink.deliver(category, &message).await {
            Ok(()) => AlertStatus::Delivered,
            Err(e) => {
                log::error!("Alert delivery via {} failed: {}", self.sink.name(), e);
                AlertStatus::Failed(e.to_string())
            }
        };
        outcome.message = Some(message);

        // Persist
        self.pause.wait_while_paused("persist").await;
        let surfaced = report.surfaced_lines();
        if !self.settings.persist {
            log::info!("Dry run: {} lines not recorded", surfaced.len());
        } else {
            match self.append_with_retry(category, &surfaced).await {
                Ok(()) => outcome.persisted_lines = surfaced.len(),
                Err(e) => {
                    log::error!("Could not record alerted lines for {}: {}", category, e);
                    outcome.persist_error = Some(e.to_string());
                }
            }
        }

        outcome.finished_at = Local::now();
        outcome
    }

    /// Append to the store, retrying a bounded number of times.
    async fn append_with_retry(&self, category: &str, lines: &[String]) -> Result<()> {
        let attempts = self.settings.append_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.store.append(category, lines).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < attempts => {
                    log::warn!(
                        "Store append for {} failed (attempt {}/{}): {}",
                        category,
                        attempt,
                        attempts,
                        e
                    );
                    tokio::time::sleep(self.settings.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run one batch per category, reading each category's input file.
    ///
    /// A category whose input cannot be read is skipped.
    pub async fn run_categories(&self, categories: &[CategoryConfig]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(categories.len());
        for category in categories {
            match read_input(&category.input).await {
                Ok(lines) => {
                    outcomes.push(self.run_batch(&category.name, lines.as_slice()).await)
                }
                Err(e) => log::error!(
                    "Skipping {}: cannot read {}: {}",
                    category.name,
                    category.input.display(),
                    e
                ),
            }
        }
        outcomes
    }

    /// Run cycles over all categories, starting one every `interval`.
    ///
    /// Stops after `cycles` cycles, or never when `None`. Each outcome is
    /// handed to `on_outcome` as soon as its batch finishes.
    pub async fn watch<F>(
        &self,
        categories: &[CategoryConfig],
        interval: Duration,
        cycles: Option<u32>,
        mut on_outcome: F,
    ) where
        F: FnMut(&BatchOutcome),
    {
        let mut cycle = 0u32;
        loop {
            cycle += 1;
            let started = tokio::time::Instant::now();
            log::info!("Cycle {} starting", cycle);
            for outcome in self.run_categories(categories).await {
                on_outcome(&outcome);
            }

            if cycles.is_some_and(|limit| cycle >= limit) {
                break;
            }
            tokio::time::sleep(remaining_interval(interval, started.elapsed())).await;
        }
        log::info!("Watch finished after {} cycles", cycle);
    }
}

/// Time left until the next cycle start; zero when the cycle overran.
fn remaining_interval(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

/// Read a capture file as lines, replacing invalid UTF-8.
pub async fn read_input(path: &Path) -> Result<Vec<String>> {
    let bytes = tokio::fs::read(path).await?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}
