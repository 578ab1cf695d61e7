//! Tree materialization over an enriched chart.
//!
//! Three modes, all pure:
//!
//! 1. [`canonical_tree`]: first-split recursion, one baseline tree per span.
//! 2. [`expand_from_cell`] / [`expand_by_tree_id`]: threshold-gated
//!    expansion; a child is only opened while the parent split's decision
//!    clears the threshold, otherwise it stays a leaf-like node.
//! 3. [`enumerate_trees`]: every tree consistent with the classifier
//!    decisions, with per-span memoization and a hard cap on the output.
//!
//! Every produced node carries a smoothed `flat_sequence`; the matcher
//! consumes nothing else.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use mitsugumi_core::error::{Error, Result};
use mitsugumi_core::types::{leaf_sequence_for_range, smooth_leaf_sequence, LeafToken, Span, Unit};

use crate::builder::Chart;

/// Expansion proceeds only while the parent decision is at least this.
pub const DEFAULT_PRED_THRESHOLD: u8 = 1;

/// Cap on the number of trees a single enumeration may materialize per span.
pub const DEFAULT_MAX_TREES: usize = 512;

/// Display classification of a node's decision state.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Gray,
    Green,
    Red,
}

impl Color {
    fn for_decision(decision: Option<u8>) -> Self {
        match decision {
            None => Color::Gray,
            Some(0) => Color::Red,
            Some(_) => Color::Green,
        }
    }
}

/// A materialized (sub)tree.
///
/// `is_terminal` marks width-1 spans. A splittable cell whose expansion was
/// stopped by the classifier keeps `is_terminal == false` and sets
/// `is_leaf_due_to_pred` instead, so a terminal node with children stays
/// unrepresentable. Children are shared through `Arc` so enumeration never
/// deep-copies a sub-tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub span: Span,
    pub text: String,
    pub is_terminal: bool,
    pub flat_sequence: Vec<LeafToken>,
    pub decision: Option<u8>,
    pub confidence: Option<f32>,
    pub color: Color,
    pub is_leaf_due_to_pred: bool,
    pub children: Option<(Arc<TreeNode>, Arc<TreeNode>)>,
}

impl TreeNode {
    fn leaf(
        chart: &Chart,
        units: &[Unit],
        span: Span,
        decision: Option<u8>,
        confidence: Option<f32>,
        is_leaf_due_to_pred: bool,
    ) -> Result<Self> {
        let cell = chart.cell(span)?;
        Ok(Self {
            span,
            text: cell.text.clone(),
            is_terminal: cell.is_terminal(),
            flat_sequence: leaf_sequence_for_range(units, span.i, span.j),
            decision,
            confidence,
            color: Color::for_decision(decision),
            is_leaf_due_to_pred,
            children: None,
        })
    }

    fn merge(
        chart: &Chart,
        span: Span,
        decision: Option<u8>,
        confidence: Option<f32>,
        left: Arc<TreeNode>,
        right: Arc<TreeNode>,
    ) -> Result<Self> {
        let cell = chart.cell(span)?;
        let mut flat_sequence =
            Vec::with_capacity(left.flat_sequence.len() + right.flat_sequence.len());
        flat_sequence.extend(left.flat_sequence.iter().cloned());
        flat_sequence.extend(right.flat_sequence.iter().cloned());
        // One smoothing pass per merge; both sides are already smoothed, so
        // only tokens around the seam can change.
        smooth_leaf_sequence(&mut flat_sequence);
        Ok(Self {
            span,
            text: cell.text.clone(),
            is_terminal: false,
            flat_sequence,
            decision,
            confidence,
            color: Color::for_decision(decision),
            is_leaf_due_to_pred: false,
            children: Some((left, right)),
        })
    }
}

/// Mode 1: resolve every non-terminal cell through its first split.
pub fn canonical_tree(chart: &Chart, units: &[Unit], span: Span) -> Result<TreeNode> {
    let cell = chart.cell(span)?;
    if cell.is_terminal() {
        return TreeNode::leaf(chart, units, span, None, None, false);
    }
    let chosen = &cell.splits[0];
    let left = canonical_tree(chart, units, chosen.left)?;
    let right = canonical_tree(chart, units, chosen.right)?;
    TreeNode::merge(
        chart,
        span,
        chosen.decision,
        chosen.confidence,
        Arc::new(left),
        Arc::new(right),
    )
}

/// One entry of a [`CellExpansion`]: the requested cell resolved through a
/// specific split, plus that split's verdict.
#[derive(Debug, Clone, Serialize)]
pub struct SplitExpansion {
    pub split_idx: usize,
    pub left: Span,
    pub right: Span,
    pub left_text: String,
    pub right_text: String,
    pub decision: Option<u8>,
    pub confidence: Option<f32>,
    pub color: Color,
    pub tree: TreeNode,
}

/// Mode 2 output: one tree per split of the requested cell.
#[derive(Debug, Clone, Serialize)]
pub struct CellExpansion {
    pub span: Span,
    pub text: String,
    pub is_terminal: bool,
    pub trees: Vec<SplitExpansion>,
}

/// Mode 2 (by tree id) output: the expansion plus the spans it visited.
#[derive(Debug, Clone, Serialize)]
pub struct TreeExpansion {
    pub tree_id: String,
    pub root_span: Span,
    pub root_text: String,
    pub root_decision: Option<u8>,
    pub root_confidence: Option<f32>,
    pub root_color: Color,
    pub tree: TreeNode,
    pub leaf_spans: Vec<Span>,
    pub expanded_spans: Vec<Span>,
}

struct Expander<'a> {
    chart: &'a Chart,
    units: &'a [Unit],
    threshold: u8,
    leaf_spans: Vec<Span>,
    expanded_spans: Vec<Span>,
}

impl<'a> Expander<'a> {
    fn new(chart: &'a Chart, units: &'a [Unit], threshold: u8) -> Self {
        Self { chart, units, threshold, leaf_spans: Vec::new(), expanded_spans: Vec::new() }
    }

    /// Expand a node below a split whose decision was `parent_decision`.
    fn node(&mut self, span: Span, parent_decision: Option<u8>) -> Result<TreeNode> {
        let cell = self.chart.cell(span)?;
        if cell.is_terminal() {
            self.leaf_spans.push(span);
            return TreeNode::leaf(self.chart, self.units, span, None, None, false);
        }
        if let Some(parent) = parent_decision {
            if parent < self.threshold {
                self.leaf_spans.push(span);
                return TreeNode::leaf(
                    self.chart,
                    self.units,
                    span,
                    Some(parent),
                    None,
                    true,
                );
            }
        }
        let first_idx = cell.splits[0].split_idx;
        self.through_split(span, first_idx)
    }

    /// Expand a cell through one specific split of its own.
    fn through_split(&mut self, span: Span, split_idx: usize) -> Result<TreeNode> {
        let cell = self.chart.cell(span)?;
        let split = &cell.splits[split_idx];
        let decision = split.decision.unwrap_or(0);
        if decision < self.threshold {
            self.leaf_spans.push(span);
            return TreeNode::leaf(
                self.chart,
                self.units,
                span,
                split.decision,
                split.confidence,
                true,
            );
        }
        self.expanded_spans.push(span);
        let (left_span, right_span) = (split.left, split.right);
        let (split_decision, split_confidence) = (split.decision, split.confidence);
        let left = self.node(left_span, Some(decision))?;
        let right = self.node(right_span, Some(decision))?;
        TreeNode::merge(
            self.chart,
            span,
            split_decision,
            split_confidence,
            Arc::new(left),
            Arc::new(right),
        )
    }
}

/// Mode 2: threshold-gated expansion from an arbitrary cell, one tree per
/// split of that cell. A terminal cell expands to zero trees.
pub fn expand_from_cell(
    chart: &Chart,
    units: &[Unit],
    span: Span,
    threshold: u8,
) -> Result<CellExpansion> {
    let cell = chart.cell(span)?;
    let text = cell.text.clone();
    if cell.is_terminal() {
        return Ok(CellExpansion { span, text, is_terminal: true, trees: Vec::new() });
    }

    let mut trees = Vec::with_capacity(cell.splits.len());
    for split in &cell.splits {
        let mut expander = Expander::new(chart, units, threshold);
        let decision = split.decision.unwrap_or(0);
        let left = expander.node(split.left, Some(decision))?;
        let right = expander.node(split.right, Some(decision))?;
        let tree = TreeNode::merge(
            chart,
            span,
            split.decision,
            split.confidence,
            Arc::new(left),
            Arc::new(right),
        )?;
        trees.push(SplitExpansion {
            split_idx: split.split_idx,
            left: split.left,
            right: split.right,
            left_text: split.left_text.clone(),
            right_text: split.right_text.clone(),
            decision: split.decision,
            confidence: split.confidence,
            color: Color::for_decision(split.decision),
            tree,
        });
    }

    Ok(CellExpansion { span, text, is_terminal: false, trees })
}

/// Mode 2, addressed by the tree id assigned during enrichment.
pub fn expand_by_tree_id(
    chart: &Chart,
    units: &[Unit],
    tree_id: &str,
    threshold: u8,
) -> Result<TreeExpansion> {
    let mut found: Option<(Span, usize)> = None;
    'outer: for cell in chart.cells() {
        for split in &cell.splits {
            if split.tree_id.as_deref() == Some(tree_id) {
                found = Some((cell.span, split.split_idx));
                break 'outer;
            }
        }
    }
    let (span, split_idx) =
        found.ok_or_else(|| Error::TreeIdNotFound(tree_id.to_string()))?;

    let (root_decision, root_confidence) = {
        let split = &chart.cell(span)?.splits[split_idx];
        (split.decision, split.confidence)
    };
    let mut expander = Expander::new(chart, units, threshold);
    let tree = expander.through_split(span, split_idx)?;
    Ok(TreeExpansion {
        tree_id: tree_id.to_string(),
        root_span: span,
        root_text: chart.cell(span)?.text.clone(),
        root_decision,
        root_confidence,
        root_color: Color::for_decision(root_decision),
        tree,
        leaf_spans: expander.leaf_spans,
        expanded_spans: expander.expanded_spans,
    })
}

/// Mode 3 output. `truncated` is set whenever the cap cut the Cartesian
/// product short anywhere below the requested cell.
#[derive(Debug, Clone, Serialize)]
pub struct Enumeration {
    pub span: Span,
    pub text: String,
    pub is_terminal: bool,
    pub trees: Vec<Arc<TreeNode>>,
    pub truncated: bool,
}

/// Mode 3: every tree consistent with the classifier decisions.
///
/// A positive split branches into the Cartesian product of its children's
/// tree lists; a non-positive split terminates the span with a single
/// leaf-like node, and all such terminations of one cell collapse into one
/// tree. Tree lists are memoized per span, so a span revisited through
/// different parent splits is computed once and shared.
pub fn enumerate_trees(
    chart: &Chart,
    units: &[Unit],
    span: Span,
    max_trees: usize,
) -> Result<Enumeration> {
    let cell = chart.cell(span)?;
    let text = cell.text.clone();
    if cell.is_terminal() {
        return Ok(Enumeration { span, text, is_terminal: true, trees: Vec::new(), truncated: false });
    }

    let mut memo: HashMap<Span, Arc<Vec<Arc<TreeNode>>>> = HashMap::new();
    let mut truncated = false;
    let trees = all_trees_for(chart, units, span, max_trees, &mut memo, &mut truncated)?;
    if truncated {
        warn!(
            i = span.i,
            j = span.j,
            max_trees,
            "tree enumeration hit the cap; output truncated"
        );
    }
    Ok(Enumeration {
        span,
        text,
        is_terminal: false,
        trees: trees.as_ref().clone(),
        truncated,
    })
}

fn all_trees_for(
    chart: &Chart,
    units: &[Unit],
    span: Span,
    max_trees: usize,
    memo: &mut HashMap<Span, Arc<Vec<Arc<TreeNode>>>>,
    truncated: &mut bool,
) -> Result<Arc<Vec<Arc<TreeNode>>>> {
    if let Some(cached) = memo.get(&span) {
        return Ok(Arc::clone(cached));
    }
    let cell = chart.cell(span)?;
    let mut trees: Vec<Arc<TreeNode>> = Vec::new();

    if cell.is_terminal() {
        trees.push(Arc::new(TreeNode::leaf(chart, units, span, None, None, false)?));
    } else {
        let mut terminated = false;
        for split in &cell.splits {
            if trees.len() >= max_trees {
                *truncated = true;
                break;
            }
            let (decision, confidence) = (split.decision, split.confidence);
            let (left_span, right_span) = (split.left, split.right);
            if decision.unwrap_or(0) == 0 {
                // Every non-positive split stops this span the same way;
                // one termination node stands for all of them.
                if !terminated {
                    terminated = true;
                    trees.push(Arc::new(TreeNode::leaf(
                        chart, units, span, decision, confidence, true,
                    )?));
                }
                continue;
            }
            let left_trees =
                all_trees_for(chart, units, left_span, max_trees, memo, truncated)?;
            let right_trees =
                all_trees_for(chart, units, right_span, max_trees, memo, truncated)?;
            'product: for left in left_trees.iter() {
                for right in right_trees.iter() {
                    if trees.len() >= max_trees {
                        *truncated = true;
                        break 'product;
                    }
                    trees.push(Arc::new(TreeNode::merge(
                        chart,
                        span,
                        decision,
                        confidence,
                        Arc::clone(left),
                        Arc::clone(right),
                    )?));
                }
            }
        }
    }

    let shared = Arc::new(trees);
    memo.insert(span, Arc::clone(&shared));
    Ok(shared)
}
