//! Error types for review-triage

use thiserror::Error;

/// Errors that can occur during classification or at the contract boundary.
///
/// The engine never fails a whole batch for a per-record problem: record-level
/// errors are caught inside the batch classifier and converted to a fail-safe
/// result, and endpoint errors trigger fallback to local computation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse input rows: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Record processing failed: {0}")]
    RecordProcessing(String),

    #[error("Classification endpoint unavailable: {0}")]
    EndpointUnavailable(String),

    #[error("Response shape mismatch: expected {expected} results, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
