//! Review Triage - deterministic, explainable classification for short review text
//!
//! The engine assigns one of four mutually-exclusive labels (valid,
//! advertisement, rant, irrelevant) to each review through a deterministic
//! pipeline: schema normalization → signal extraction → rule scoring → span
//! highlighting. Every decision comes with a calibrated score distribution,
//! violated-policy reasons, and character-offset evidence spans.
//!
//! ## Modules
//!
//! - **schema**: Map heterogeneous tabular rows to canonical records
//! - **pipeline**: Batch classification with per-record failure isolation
//! - **endpoint**: The batch contract seam with remote-to-local fallback

pub mod config;
pub mod endpoint;
pub mod error;
pub mod highlight;
pub mod pipeline;
pub mod schema;
pub mod scorer;
pub mod signals;
pub mod types;

pub use config::{ClassifierConfig, Lexicons, RuleWeights};
pub use endpoint::{BatchEndpoint, FallbackClassifier};
pub use error::EngineError;
pub use pipeline::{BatchOutput, ReviewClassifier};

// Schema exports
pub use schema::{AliasTable, CanonicalField};

// Data model exports
pub use types::{
    ClassificationResult, Label, NormalizedRecord, RawRecord, RawValue, ScoreDistribution,
    Signals, Span, SpanCategory,
};

/// Engine version embedded in CLI reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI reports
pub const PRODUCER_NAME: &str = "review-triage";
