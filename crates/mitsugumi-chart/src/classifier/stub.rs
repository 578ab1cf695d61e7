//! Deterministic classifiers for tests and offline runs.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{Prediction, SplitClassifier, SplitPair};

/// Answers every pair with the same fixed verdict.
#[derive(Debug, Clone, Copy)]
pub struct StubClassifier {
    prediction: Prediction,
}

impl StubClassifier {
    pub fn new(decision: u8, confidence: f32) -> Self {
        Self { prediction: Prediction { decision, confidence } }
    }

    /// Every split combines: produces the maximally branching chart.
    pub fn combine_all() -> Self {
        Self::new(1, 1.0)
    }

    /// No split combines: every expansion terminates immediately.
    pub fn split_none() -> Self {
        Self::new(0, 1.0)
    }
}

#[async_trait]
impl SplitClassifier for StubClassifier {
    fn classifier_id(&self) -> &str {
        "stub:fixed"
    }

    async fn classify_batch(&self, pairs: &[SplitPair]) -> anyhow::Result<Vec<Prediction>> {
        Ok(vec![self.prediction; pairs.len()])
    }
}

/// Answers from an explicit `(left, right) -> prediction` table, falling
/// back to a default for pairs the table does not cover. Test fixtures use
/// this to pin individual split decisions.
#[derive(Debug, Clone, Default)]
pub struct TableClassifier {
    table: HashMap<SplitPair, Prediction>,
    default: Option<Prediction>,
}

impl TableClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(decision: u8, confidence: f32) -> Self {
        Self { table: HashMap::new(), default: Some(Prediction { decision, confidence }) }
    }

    pub fn insert(
        &mut self,
        left: impl Into<String>,
        right: impl Into<String>,
        decision: u8,
        confidence: f32,
    ) {
        self.table
            .insert(SplitPair::new(left, right), Prediction { decision, confidence });
    }
}

#[async_trait]
impl SplitClassifier for TableClassifier {
    fn classifier_id(&self) -> &str {
        "stub:table"
    }

    async fn classify_batch(&self, pairs: &[SplitPair]) -> anyhow::Result<Vec<Prediction>> {
        let fallback = self.default.unwrap_or(Prediction { decision: 0, confidence: 0.0 });
        Ok(pairs
            .iter()
            .map(|pair| self.table.get(pair).copied().unwrap_or(fallback))
            .collect())
    }
}
