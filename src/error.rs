use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a region.
///
/// None of these are retried: a region either commits its full table or
/// nothing at all.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("{}{}: {message}", .path.display(), location(.line, .column))]
    MalformedInput {
        path: PathBuf,
        /// 1-based data line (header excluded), when the problem is row-specific.
        line: Option<u64>,
        column: Option<String>,
        message: String,
    },

    #[error("failed to write {}: {message}", .path.display())]
    Persistence { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown region code '{0}'")]
    UnknownRegion(String),
}

fn location(line: &Option<u64>, column: &Option<String>) -> String {
    match (line, column) {
        (Some(l), Some(c)) => format!(" (line {l}, column {c})"),
        (Some(l), None) => format!(" (line {l})"),
        (None, Some(c)) => format!(" (column {c})"),
        (None, None) => String::new(),
    }
}

impl PipelineError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PipelineError::MalformedInput {
            path: path.into(),
            line: None,
            column: None,
            message: message.into(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        PipelineError::Persistence {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
