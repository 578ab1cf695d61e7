//! Domain types shared by the chart and matching engines.

use serde::{Deserialize, Serialize};

/// Content-bearing vs. purely grammatical morpheme classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MorphKind {
    Core,
    Func,
}

impl Default for MorphKind {
    fn default() -> Self {
        MorphKind::Core
    }
}

/// Stem compatibility hint attached by the segmenter to some morphemes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StemType {
    SaHen,
    Other,
}

/// A single morpheme inside a unit.
///
/// - `text`: surface form
/// - `pos`: coarse part-of-speech tag (e.g., "NOUN")
/// - `tag`: fine-grained tag from the segmenter
/// - `kind`: content (`core`) vs. functional (`func`)
/// - `stem_type`: optional verbal-noun compatibility hint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Morpheme {
    pub text: String,
    pub pos: String,
    pub tag: String,
    pub kind: MorphKind,
    pub stem_type: Option<StemType>,
}

/// A bunsetsu: the minimal syntactic chunk the chart is built over.
///
/// `id` is the ordered position within the sentence; `text` is the
/// concatenation of the morpheme surface forms. Units are created once per
/// sentence by [`crate::normalize::normalize_units`] and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    pub id: usize,
    pub text: String,
    pub morphemes: Vec<Morpheme>,
}

/// Inclusive span of unit indices `(i, j)`, `i <= j`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    pub i: usize,
    pub j: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

impl Span {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    /// Number of units covered.
    pub fn width(&self) -> usize {
        self.j - self.i + 1
    }

    /// A span of length 1 is a terminal cell.
    pub fn is_terminal(&self) -> bool {
        self.i == self.j
    }
}

/// One element of a tree node's linearized leaf stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeafToken {
    pub kind: MorphKind,
    pub text: String,
}

impl LeafToken {
    pub fn new(kind: MorphKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

/// Collect the raw leaf stream for a contiguous unit range, then smooth it.
pub fn leaf_sequence_for_range(units: &[Unit], i: usize, j: usize) -> Vec<LeafToken> {
    let mut seq = Vec::new();
    for unit in units.iter().take(j + 1).skip(i) {
        for m in &unit.morphemes {
            seq.push(LeafToken::new(m.kind, m.text.clone()));
        }
    }
    smooth_leaf_sequence(&mut seq);
    seq
}

/// Reclassify any `func` token sandwiched between two `core` tokens as `core`.
///
/// Single left-to-right pass. A flip can enable the position to its right
/// within the same pass (the left neighbor is re-read after mutation), but the
/// pass is idempotent: re-running it on its own output changes nothing.
pub fn smooth_leaf_sequence(seq: &mut [LeafToken]) {
    if seq.len() < 3 {
        return;
    }
    for idx in 1..seq.len() - 1 {
        if seq[idx].kind == MorphKind::Func
            && seq[idx - 1].kind == MorphKind::Core
            && seq[idx + 1].kind == MorphKind::Core
        {
            seq[idx].kind = MorphKind::Core;
        }
    }
}
