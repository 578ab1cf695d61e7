//! Split classifier abstraction used by score enrichment.
//!
//! The classifier is the pipeline's only external collaborator at runtime:
//! one batched call per chart, index-aligned request and response.
//! Implementations may call a remote model server (`http`) or answer
//! deterministically (`stub`, used in tests and as the offline fallback).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One candidate split, denormalized to the two surface strings the
/// classifier scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SplitPair {
    pub left: String,
    pub right: String,
}

impl SplitPair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self { left: left.into(), right: right.into() }
    }
}

/// Classifier verdict for one pair: `decision` is 1 (combine) or 0
/// (do not combine), `confidence` in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub decision: u8,
    pub confidence: f32,
}

#[async_trait]
pub trait SplitClassifier: Send + Sync {
    /// Stable identifier for the classifier/model (e.g., `http:dep-model`).
    fn classifier_id(&self) -> &str;

    /// Score a batch of pairs. The returned vector must be index-aligned
    /// with the request and of the same length.
    async fn classify_batch(&self, pairs: &[SplitPair]) -> anyhow::Result<Vec<Prediction>>;
}

mod http;
mod stub;

pub use http::HttpClassifier;
pub use stub::{StubClassifier, TableClassifier};
