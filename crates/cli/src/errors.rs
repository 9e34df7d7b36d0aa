//! Errors raised by case loading and batch evaluation

use reimburse_core::ScoringError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading case files or evaluating a batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}, line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{path}: invalid case file: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {index}: {source}")]
    Case {
        index: usize,
        #[source]
        source: ScoringError,
    },
}
