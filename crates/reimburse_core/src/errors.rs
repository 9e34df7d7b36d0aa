//! Error types for the reimbursement scoring core

use crate::canonical::CanonicalError;
use thiserror::Error;

/// Errors that can occur while loading a model or scoring a trip
#[derive(Error, Debug)]
pub enum ScoringError {
    /// The decision tree has no root node
    #[error("Decision tree is empty")]
    EmptyTree,

    /// A split node references a feature the deriver does not produce
    #[error("Unknown feature `{0}` referenced by decision tree")]
    UnknownFeature(String),

    /// Caller supplied a non-finite or negative input
    #[error("Invalid input {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    /// Model document is structurally malformed
    #[error("Invalid model format: {0}")]
    InvalidFormat(String),

    /// Loaded model does not match the pinned hash
    #[error("Model hash mismatch: expected {expected}, computed {actual}")]
    HashMismatch { expected: String, actual: String },

    /// Value cannot be represented as a currency amount
    #[error("Value {0} cannot be rounded to currency")]
    UnroundableValue(f64),

    /// Configuration could not be loaded or applied
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Canonical serialization error
    #[error("Canonical serialization error: {0}")]
    Canonical(#[from] CanonicalError),
}

/// Result type for scoring operations
pub type Result<T> = std::result::Result<T, ScoringError>;
