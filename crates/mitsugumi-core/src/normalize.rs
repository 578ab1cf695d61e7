//! Span normalizer: segmenter payload to ordered, immutable [`Unit`]s.
//!
//! The external morphological tagger hands over one JSON object per
//! bunsetsu. This module deserializes that payload, folds the surface text
//! (bracket variants, then NFKC) and materializes the domain types.

use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

use crate::types::{MorphKind, Morpheme, StemType, Unit};

/// One morpheme as emitted by the segmenter.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMorpheme {
    pub text: String,
    #[serde(default = "unknown_tag")]
    pub pos: String,
    #[serde(default = "unknown_tag")]
    pub tag: String,
    #[serde(rename = "type", default)]
    pub kind: MorphKind,
    #[serde(default)]
    pub stem_type: Option<String>,
}

/// One bunsetsu as emitted by the segmenter.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBunsetsu {
    #[serde(rename = "bunsetu")]
    pub morphemes: Vec<RawMorpheme>,
}

fn unknown_tag() -> String {
    "UNK".to_string()
}

/// Fold bracket variants the downstream patterns never use, then apply NFKC.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .chars()
        .map(|c| match c {
            '（' => '(',
            '）' => ')',
            '「' | '」' => '"',
            other => other,
        })
        .collect();
    folded.nfkc().collect()
}

fn parse_stem_type(raw: Option<&str>) -> Option<StemType> {
    match raw {
        Some("sa_hen") => Some(StemType::SaHen),
        Some(_) => Some(StemType::Other),
        None => None,
    }
}

/// Convert the segmenter payload into ordered units with concatenated text.
///
/// Position in the input slice becomes the unit `id`. Morpheme surface forms
/// are normalized before concatenation so the chart, the trees and the
/// matcher all see one consistent alphabet.
pub fn normalize_units(raw: &[RawBunsetsu]) -> Vec<Unit> {
    raw.iter()
        .enumerate()
        .map(|(id, item)| {
            let morphemes: Vec<Morpheme> = item
                .morphemes
                .iter()
                .map(|m| Morpheme {
                    text: normalize_text(&m.text),
                    pos: m.pos.clone(),
                    tag: m.tag.clone(),
                    kind: m.kind,
                    stem_type: parse_stem_type(m.stem_type.as_deref()),
                })
                .collect();
            let text = morphemes.iter().map(|m| m.text.as_str()).collect();
            Unit { id, text, morphemes }
        })
        .collect()
}
