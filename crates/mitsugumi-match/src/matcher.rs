//! Linear matcher over a tree node's flattened leaf stream.
//!
//! Matching is attempted at every start offset in increasing order; the
//! first success wins. Within one attempt, pattern tokens consume leaves
//! strictly left to right with no backtracking: a slot greedily eats
//! consecutive `core` leaves, a literal must find its character inside a
//! `func` leaf (or a registered connective synonym of it), and the wildcard
//! accepts any leaf the connective dictionary knows.

use std::collections::BTreeMap;

use tracing::debug;

use mitsugumi_core::connectives::ConnectiveDict;
use mitsugumi_core::types::{LeafToken, MorphKind};

use crate::pattern::{Pattern, PatternToken, VERBAL_NOUN_TAG};

/// Verbs the verbal-noun tag constraint accepts outright.
const VERBAL_NOUN_VERBS: [&str; 31] = [
    "する",
    "説明する",
    "発表する",
    "検討する",
    "判断する",
    "提案する",
    "実施する",
    "分析する",
    "評価する",
    "整理する",
    "確認する",
    "変更する",
    "削除する",
    "追加する",
    "修正する",
    "更新する",
    "設定する",
    "配置する",
    "配列する",
    "作成する",
    "設計する",
    "実行する",
    "開始する",
    "終了する",
    "中止する",
    "延期する",
    "進行する",
    "解決する",
    "対応する",
    "処理する",
    "管理する",
];

/// A slot's bound text plus the half-open leaf index range it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBinding {
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub parent_depth: usize,
}

/// One successful match attempt.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub bindings: BTreeMap<String, SlotBinding>,
    pub start: usize,
    pub end: usize,
}

/// The matcher owns its connective dictionary; no process-global state.
#[derive(Debug, Clone)]
pub struct Matcher {
    connectives: ConnectiveDict,
}

impl Matcher {
    pub fn new(connectives: ConnectiveDict) -> Self {
        Self { connectives }
    }

    /// Windowed search. An empty leaf stream is an unconditional non-match,
    /// not a fault.
    pub fn match_pattern(&self, pattern: &Pattern, leaves: &[LeafToken]) -> Option<MatchResult> {
        if leaves.is_empty() {
            debug!(pattern = pattern.raw(), "no flat sequence to match against");
            return None;
        }
        (0..leaves.len()).find_map(|start| self.match_at(pattern, leaves, start))
    }

    fn match_at(
        &self,
        pattern: &Pattern,
        leaves: &[LeafToken],
        start: usize,
    ) -> Option<MatchResult> {
        let mut bindings = BTreeMap::new();
        let mut pos = start;

        for token in pattern.tokens() {
            match token {
                PatternToken::Slot { name, tag, parent_depth } => {
                    let slot_start = pos;
                    let mut value = String::new();
                    while pos < leaves.len() && leaves[pos].kind == MorphKind::Core {
                        value.push_str(&leaves[pos].text);
                        pos += 1;
                    }
                    if value.is_empty() {
                        debug!(slot = name.as_str(), pos, "slot found no core leaf");
                        return None;
                    }
                    if tag.as_deref() == Some(VERBAL_NOUN_TAG)
                        && !is_verbal_noun_compatible(&value)
                    {
                        debug!(slot = name.as_str(), value = value.as_str(), "verbal-noun constraint failed");
                        return None;
                    }
                    bindings.insert(
                        name.clone(),
                        SlotBinding { value, start: slot_start, end: pos, parent_depth: *parent_depth },
                    );
                }
                PatternToken::WildcardConnective => {
                    let leaf = leaves.get(pos)?;
                    if !self.connectives.is_connective(&leaf.text) {
                        debug!(text = leaf.text.as_str(), "leaf is not a known connective");
                        return None;
                    }
                    pos += 1;
                }
                PatternToken::Literal(ch) => {
                    let leaf = leaves.get(pos)?;
                    if leaf.kind != MorphKind::Func {
                        return None;
                    }
                    let literal = ch.to_string();
                    if self.connectives.synonym_match(&literal, &leaf.text)
                        || leaf.text.contains(*ch)
                    {
                        pos += 1;
                    } else {
                        debug!(
                            literal = literal.as_str(),
                            text = leaf.text.as_str(),
                            "literal not found in func leaf"
                        );
                        return None;
                    }
                }
            }
        }

        debug!(start, end = pos, "pattern matched");
        Some(MatchResult { bindings, start, end: pos })
    }
}

/// The bound text satisfies the サ変 constraint when it is one of the known
/// verbs, or ends in する preceded by at least one CJK ideograph.
fn is_verbal_noun_compatible(verb: &str) -> bool {
    if VERBAL_NOUN_VERBS.contains(&verb) {
        return true;
    }
    if let Some(prefix) = verb.strip_suffix("する") {
        if !prefix.is_empty() && prefix.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c)) {
            return true;
        }
    }
    false
}
