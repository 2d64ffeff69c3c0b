//! Per-item outcomes of the validate/test/package pipeline.

use std::fmt;

use thiserror::Error;

/// Pipeline stage an item failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Integrity,
    Tests,
    Package,
    Relocate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Integrity => "integrity",
            Self::Tests => "tests",
            Self::Package => "package",
            Self::Relocate => "relocate",
        };
        f.write_str(label)
    }
}

/// Error raised by a pipeline stage.
///
/// `message` is the one-line cause; `detail` carries the captured stack
/// trace or process output, and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
    pub detail: String,
}

impl StageError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            detail: String::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// Why an item did not produce an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// A stage reported an error.
    Raised(StageError),
    /// Packaging returned cleanly but the artifact file never appeared.
    ArtifactMissing { extension: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raised(err) if err.detail.trim().is_empty() => write!(f, "{}", err.message),
            Self::Raised(err) => write!(f, "{}\n{}", err.message, err.detail.trim_end()),
            Self::ArtifactMissing { extension } => {
                write!(f, "{} file not created", extension.trim_start_matches('.'))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub item: String,
    pub reason: FailureReason,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item, self.reason)
    }
}

/// Exactly one of these is produced for every item processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Success(String),
    Failure(ItemFailure),
}

impl ItemOutcome {
    pub fn item(&self) -> &str {
        match self {
            Self::Success(item) => item,
            Self::Failure(failure) => &failure.item,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
