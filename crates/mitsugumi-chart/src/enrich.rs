//! Score enrichment: one batched classifier round trip per chart.
//!
//! Pairs are collected in chart build order (span width ascending, start
//! ascending, split index ascending), scored in a single request, and the
//! verdicts written back onto the originating splits. Tree ids are assigned
//! at the same time; both the batch order and the id scheme are part of the
//! external contract and must be byte-stable for a structurally identical
//! chart.

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use mitsugumi_core::types::Span;

use crate::builder::Chart;
use crate::classifier::{SplitClassifier, SplitPair};

/// Counts reported after a successful enrichment pass.
#[derive(Debug, Clone, Copy)]
pub struct EnrichStats {
    pub pairs: usize,
    pub positive: usize,
    pub negative: usize,
}

/// Score every split of the chart with one classifier call and assign
/// stable tree ids. This is the pipeline's only suspension point.
pub async fn enrich(
    chart: &mut Chart,
    classifier: &dyn SplitClassifier,
) -> Result<EnrichStats> {
    let mut pairs = Vec::new();
    let mut origins: Vec<(Span, usize)> = Vec::new();
    for span in chart.spans_in_build_order() {
        let cell = chart.cell(span)?;
        for split in &cell.splits {
            pairs.push(SplitPair::new(split.left_text.clone(), split.right_text.clone()));
            origins.push((span, split.split_idx));
        }
    }

    info!(
        pairs = pairs.len(),
        classifier = classifier.classifier_id(),
        "enriching chart splits"
    );

    let mut positive = 0;
    let mut negative = 0;
    if !pairs.is_empty() {
        let predictions = classifier.classify_batch(&pairs).await?;
        if predictions.len() != pairs.len() {
            return Err(anyhow!(
                "classifier returned {} predictions for {} pairs",
                predictions.len(),
                pairs.len()
            ));
        }
        for ((span, split_idx), prediction) in origins.into_iter().zip(predictions) {
            let cell = chart.cell_mut(span)?;
            let split = &mut cell.splits[split_idx];
            split.decision = Some(prediction.decision);
            split.confidence = Some(prediction.confidence);
            if prediction.decision >= 1 {
                positive += 1;
            } else {
                negative += 1;
            }
        }
    }

    assign_tree_ids(chart)?;

    debug!(positive, negative, "chart enrichment complete");
    Ok(EnrichStats { pairs: positive + negative, positive, negative })
}

/// Assign the deterministic tree id to every split.
///
/// Depth-first from the root span; within a cell, sibling order is split
/// index order and ids concatenate along the path (`"0"`, `"0-1"`, ...).
/// The walk descends into each split's right child. The first visit to a
/// cell wins; splits in cells the walk never reaches get the positional
/// fallback `"(i,j)-idx"`.
fn assign_tree_ids(chart: &mut Chart) -> Result<()> {
    if chart.n() < 2 {
        return Ok(());
    }

    let mut assignments: Vec<(Span, usize, String)> = Vec::new();
    let mut visited: HashSet<Span> = HashSet::new();
    walk(chart, chart.root_span(), "", &mut visited, &mut assignments)?;

    for (span, split_idx, id) in assignments {
        let cell = chart.cell_mut(span)?;
        cell.splits[split_idx].tree_id = Some(id);
    }

    // Positional fallback for splits outside the root walk.
    let spans: Vec<Span> = chart.cells().map(|c| c.span).collect();
    for span in spans {
        let cell = chart.cell_mut(span)?;
        for split in &mut cell.splits {
            if split.tree_id.is_none() {
                split.tree_id =
                    Some(format!("({},{})-{}", span.i, span.j, split.split_idx));
            }
        }
    }
    Ok(())
}

fn walk(
    chart: &Chart,
    span: Span,
    prefix: &str,
    visited: &mut HashSet<Span>,
    out: &mut Vec<(Span, usize, String)>,
) -> Result<()> {
    let cell = chart.cell(span)?;
    if cell.is_terminal() || !visited.insert(span) {
        return Ok(());
    }
    for split in &cell.splits {
        let id = if prefix.is_empty() {
            split.split_idx.to_string()
        } else {
            format!("{}-{}", prefix, split.split_idx)
        };
        out.push((span, split.split_idx, id.clone()));
        walk(chart, split.right, &id, visited, out)?;
    }
    Ok(())
}
