//! Batch classification contract boundary
//!
//! The same request/response shape serves as the local function signature and
//! as the wire shape for an optional remote endpoint: a sequence of raw text
//! strings in, a same-length same-order sequence of results out. A transport
//! implements [`BatchEndpoint`]; the engine never talks to the network itself.
//!
//! Fallback rule: when the endpoint is unreachable, errors, or returns a
//! response outside the contract shape, the caller transparently receives the
//! local computation instead. Callers cannot distinguish remote from local
//! origin by the response shape.

use crate::error::EngineError;
use crate::pipeline::ReviewClassifier;
use crate::types::ClassificationResult;

/// A remote (or otherwise external) implementation of the batch contract.
///
/// Implementations perform one atomic call per batch: either the full result
/// sequence comes back or the call fails.
pub trait BatchEndpoint {
    fn classify_batch(&self, texts: &[String]) -> Result<Vec<ClassificationResult>, EngineError>;
}

/// Wraps an optional endpoint around the local engine, enforcing the fallback
/// rule at the boundary so transports stay trivial.
pub struct FallbackClassifier<E> {
    endpoint: Option<E>,
    local: ReviewClassifier,
}

impl<E: BatchEndpoint> FallbackClassifier<E> {
    pub fn new(endpoint: Option<E>, local: ReviewClassifier) -> Self {
        FallbackClassifier { endpoint, local }
    }

    /// Local-only classifier; present so callers can hold one type whether or
    /// not an endpoint is configured.
    pub fn local_only(local: ReviewClassifier) -> Self {
        FallbackClassifier {
            endpoint: None,
            local,
        }
    }

    pub fn local(&self) -> &ReviewClassifier {
        &self.local
    }

    /// Classify a batch, preferring the endpoint and falling back to local
    /// computation on any endpoint failure or shape mismatch. Infallible by
    /// design: the fallback path is pure local computation.
    pub fn classify_batch(&self, texts: &[String]) -> Vec<ClassificationResult> {
        if let Some(endpoint) = &self.endpoint {
            match endpoint.classify_batch(texts) {
                Ok(results) if results.len() == texts.len() => return results,
                // Length mismatch violates the contract; treat like an outage.
                Ok(_) | Err(_) => {}
            }
        }
        self.local.classify_texts(texts)
    }
}
