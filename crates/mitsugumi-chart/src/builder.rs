//! Dense span chart over the unit sequence.
//!
//! Every contiguous span of length >= 1 gets a cell, and every internal
//! break point of a cell gets a split. No linguistic rule rejects a split
//! here; pruning is the classifier's job during enrichment.

use std::collections::BTreeMap;

use serde::Serialize;

use mitsugumi_core::error::{Error, Result};
use mitsugumi_core::types::{Span, Unit};

/// A candidate binary division of a cell at break point `k`.
///
/// `decision`, `confidence` and `tree_id` stay `None` until enrichment
/// writes the classifier verdict back.
#[derive(Debug, Clone, Serialize)]
pub struct Split {
    pub k: usize,
    pub split_idx: usize,
    pub left: Span,
    pub right: Span,
    pub left_text: String,
    pub right_text: String,
    pub decision: Option<u8>,
    pub confidence: Option<f32>,
    pub tree_id: Option<String>,
}

/// One chart entry: a span, its concatenated text and its ordered splits.
#[derive(Debug, Clone, Serialize)]
pub struct Cell {
    pub span: Span,
    pub text: String,
    pub splits: Vec<Split>,
}

impl Cell {
    pub fn is_terminal(&self) -> bool {
        self.span.is_terminal()
    }
}

/// The full triangular table. Storage is a flat `Vec` in row-major order
/// (all spans starting at 0, then all starting at 1, ...), addressed by
/// arithmetic on the span indices, so every span of 1..=n units is present
/// by construction.
#[derive(Debug, Clone)]
pub struct Chart {
    n: usize,
    cells: Vec<Cell>,
}

/// Aggregate counts, mostly for logging and CLI summaries.
#[derive(Debug, Clone, Serialize)]
pub struct ChartStats {
    pub total_cells: usize,
    pub total_splits: usize,
    pub splits_by_width: BTreeMap<usize, usize>,
}

impl Chart {
    /// Number of units the chart was built over.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The span covering the whole sentence.
    pub fn root_span(&self) -> Span {
        Span::new(0, self.n - 1)
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    fn index(&self, span: Span) -> Option<usize> {
        if span.i > span.j || span.j >= self.n {
            return None;
        }
        let row_offset = span.i * self.n - (span.i * span.i.saturating_sub(1)) / 2;
        Some(row_offset + (span.j - span.i))
    }

    /// Look up a cell by caller-supplied coordinates.
    pub fn cell(&self, span: Span) -> Result<&Cell> {
        self.index(span)
            .map(|idx| &self.cells[idx])
            .ok_or(Error::CellNotFound { span })
    }

    pub(crate) fn cell_mut(&mut self, span: Span) -> Result<&mut Cell> {
        let idx = self.index(span).ok_or(Error::CellNotFound { span })?;
        Ok(&mut self.cells[idx])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Spans in chart build order: width ascending, start ascending. This is
    /// the order enrichment batches splits in, so it is load-bearing for the
    /// classifier request contract.
    pub fn spans_in_build_order(&self) -> Vec<Span> {
        let mut spans = Vec::with_capacity(self.cells.len());
        for width in 1..=self.n {
            for i in 0..=self.n - width {
                spans.push(Span::new(i, i + width - 1));
            }
        }
        spans
    }

    pub fn stats(&self) -> ChartStats {
        let mut splits_by_width = BTreeMap::new();
        let mut total_splits = 0;
        for cell in &self.cells {
            let count = cell.splits.len();
            total_splits += count;
            *splits_by_width.entry(cell.span.width()).or_insert(0) += count;
        }
        ChartStats { total_cells: self.cells.len(), total_splits, splits_by_width }
    }
}

/// Build the complete chart for an ordered unit sequence.
///
/// Fails only on empty input. For spans of width >= 2 every break point
/// `k in i..j` yields a split whose left and right child spans are cells of
/// the same chart; the dense layout makes that hold by induction.
pub fn build(units: &[Unit]) -> Result<Chart> {
    if units.is_empty() {
        return Err(Error::EmptyInput);
    }
    let n = units.len();

    let text_of = |i: usize, j: usize| -> String {
        units[i..=j].iter().map(|u| u.text.as_str()).collect()
    };

    let mut cells = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in i..n {
            let span = Span::new(i, j);
            let mut splits = Vec::new();
            if i < j {
                for (split_idx, k) in (i..j).enumerate() {
                    splits.push(Split {
                        k,
                        split_idx,
                        left: Span::new(i, k),
                        right: Span::new(k + 1, j),
                        left_text: text_of(i, k),
                        right_text: text_of(k + 1, j),
                        decision: None,
                        confidence: None,
                        tree_id: None,
                    });
                }
            }
            cells.push(Cell { span, text: text_of(i, j), splits });
        }
    }

    Ok(Chart { n, cells })
}
