//! Aggregation of item outcomes into per-directory and run-wide reports.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::core::outcome::{ItemFailure, ItemOutcome};

const NOT_FOUND: &str = "Directory not found";

/// Outcomes of one target directory, partitioned by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub successes: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

impl BatchResult {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Success(item) => self.successes.push(item),
            ItemOutcome::Failure(failure) => self.failures.push(failure),
        }
    }

    pub fn item_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

impl FromIterator<ItemOutcome> for BatchResult {
    fn from_iter<I: IntoIterator<Item = ItemOutcome>>(iter: I) -> Self {
        let mut batch = Self::default();
        for outcome in iter {
            batch.record(outcome);
        }
        batch
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveStatus {
    /// No successes, so no archive was written.
    Skipped,
    Created(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryOutcome {
    NotFound,
    /// The directory exists but its items or output location were unusable.
    Unreadable(String),
    Processed {
        batch: BatchResult,
        archive: ArchiveStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryReport {
    /// Target exactly as listed by the caller.
    pub target: String,
    pub outcome: DirectoryOutcome,
}

impl DirectoryReport {
    pub fn successes(&self) -> &[String] {
        match &self.outcome {
            DirectoryOutcome::Processed { batch, .. } => &batch.successes,
            _ => &[],
        }
    }

    /// Failure lines as shown in the summary, one per failed item or issue.
    pub fn failure_lines(&self) -> Vec<String> {
        match &self.outcome {
            DirectoryOutcome::NotFound => vec![NOT_FOUND.to_string()],
            DirectoryOutcome::Unreadable(message) => vec![message.clone()],
            DirectoryOutcome::Processed { batch, archive } => {
                let mut lines: Vec<String> =
                    batch.failures.iter().map(ToString::to_string).collect();
                if let ArchiveStatus::Failed(message) = archive {
                    lines.push(format!("archive: {message}"));
                }
                lines
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failure_lines().is_empty()
    }
}

/// Run-wide report, one entry per listed target in listed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalReport {
    pub directories: Vec<DirectoryReport>,
}

impl GlobalReport {
    /// Append a directory report, returning the extended report.
    pub fn with(mut self, report: DirectoryReport) -> Self {
        self.directories.push(report);
        self
    }

    pub fn has_failures(&self) -> bool {
        self.directories.iter().any(DirectoryReport::has_failures)
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            crate::exit_codes::FAILURE
        } else {
            crate::exit_codes::OK
        }
    }
}

/// Render the human-readable end-of-run summary.
pub fn render_summary(report: &GlobalReport) -> String {
    let mut out = String::from("summary:\n");
    for directory in &report.directories {
        let _ = writeln!(out, "\n{}:", directory.target);

        let successes = directory.successes();
        if !successes.is_empty() {
            let _ = writeln!(out, "  succeeded: {}", successes.len());
            for item in successes {
                let _ = writeln!(out, "    - {item}");
            }
        }

        let failures = directory.failure_lines();
        if !failures.is_empty() {
            let _ = writeln!(out, "  failed: {}", failures.len());
            for failure in failures {
                write_indented_item(&mut out, &failure);
            }
        }

        if let DirectoryOutcome::Processed { batch, archive } = &directory.outcome {
            if batch.item_count() == 0 {
                let _ = writeln!(out, "  no items");
            }
            if let ArchiveStatus::Created(path) = archive {
                let _ = writeln!(out, "  archive: {}", path.display());
            }
        }
    }
    out
}

fn write_indented_item(out: &mut String, text: &str) {
    let mut lines = text.lines();
    if let Some(first) = lines.next() {
        let _ = writeln!(out, "    - {first}");
    }
    for line in lines {
        let _ = writeln!(out, "      {line}");
    }
}
