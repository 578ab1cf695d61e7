//! Triple extraction from slot bindings.
//!
//! Every `Y`-prefixed slot with a bound value is a predicate; every bound
//! `X`-prefixed slot is a candidate argument. Candidates are ranked by tree
//! distance from the predicate, descending. The farthest candidate becomes
//! the object and the runner-up the subject; a lone candidate becomes the
//! object with the φ placeholder as subject. Ranking the farthest candidate
//! as object is a deliberate policy (a default right-attachment
//! preference), not an incidental tie-break.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use mitsugumi_chart::TreeNode;

use crate::matcher::{MatchResult, Matcher, SlotBinding};
use crate::pattern::Pattern;

/// Placeholder subject emitted when a predicate has exactly one argument.
pub const PLACEHOLDER_SUBJECT: &str = "φ";

/// Functional suffixes stripped when comparing node text by content only.
const FUNCTIONAL_MARKERS: [&str; 17] = [
    "ている", "たい", "られた", "の", "が", "を", "に", "は", "へ", "から", "まで", "で",
    "た", "だ", "ます", "です", "ない",
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// Extract ordered triples from one successful match against `tree`.
pub fn extract_triples(result: &MatchResult, pattern: &Pattern, tree: &TreeNode) -> Vec<Triple> {
    let slots = pattern.slots();
    let y_slots: Vec<(&str, usize)> =
        slots.iter().filter(|(n, _)| n.starts_with('Y')).copied().collect();
    let x_slots: Vec<(&str, usize)> =
        slots.iter().filter(|(n, _)| n.starts_with('X')).copied().collect();

    let registry = NodeRegistry::build(tree);
    let mut triples = Vec::new();

    for &(y_name, y_depth) in &y_slots {
        let Some(y_text) = resolve_slot(&result.bindings, y_name, y_depth) else {
            continue;
        };

        // (distance, leaf start, name, value), ranked descending.
        let mut candidates: Vec<(usize, usize, &str, &str)> = Vec::new();
        for &(x_name, x_depth) in &x_slots {
            let Some(x_text) = resolve_slot(&result.bindings, x_name, x_depth) else {
                continue;
            };
            let distance = match registry.distance(y_text, x_text) {
                Some(d) => {
                    debug!(y = y_text, x = x_text, distance = d, "tree distance");
                    d
                }
                None => {
                    // Tree search failed: fall back to slot-position distance.
                    let y_pos = slot_position(&slots, y_name);
                    let x_pos = slot_position(&slots, x_name);
                    let d = y_pos.abs_diff(x_pos);
                    debug!(y = y_text, x = x_text, distance = d, "slot-position fallback");
                    d
                }
            };
            let seq_start = result.bindings.get(x_name).map_or(0, |b| b.start);
            candidates.push((distance, seq_start, x_name, x_text));
        }

        candidates.sort_by(|a, b| match b.0.cmp(&a.0) {
            Ordering::Equal => match b.1.cmp(&a.1) {
                Ordering::Equal => b.2.cmp(a.2),
                other => other,
            },
            other => other,
        });

        match candidates.len() {
            0 => {}
            1 => triples.push(Triple {
                subject: PLACEHOLDER_SUBJECT.to_string(),
                predicate: y_text.to_string(),
                object: candidates[0].3.to_string(),
            }),
            _ => triples.push(Triple {
                subject: candidates[1].3.to_string(),
                predicate: y_text.to_string(),
                object: candidates[0].3.to_string(),
            }),
        }
    }

    triples
}

/// Resolve a slot's bound text. Parent-depth slots resolve by any-depth
/// search over the already-bound values under the same name; the depth
/// parameter is carried but not used to limit the search.
fn resolve_slot<'a>(
    bindings: &'a BTreeMap<String, SlotBinding>,
    name: &str,
    _parent_depth: usize,
) -> Option<&'a str> {
    bindings
        .get(name)
        .map(|b| b.value.as_str())
        .filter(|v| !v.is_empty())
}

fn slot_position(slots: &[(&str, usize)], name: &str) -> usize {
    slots.iter().position(|(n, _)| *n == name).unwrap_or(slots.len())
}

/// Flat view of a tree with parent links, for distance queries.
struct NodeRegistry<'a> {
    nodes: Vec<&'a TreeNode>,
    parents: Vec<Option<usize>>,
}

impl<'a> NodeRegistry<'a> {
    fn build(root: &'a TreeNode) -> Self {
        let mut registry = Self { nodes: Vec::new(), parents: Vec::new() };
        registry.visit(root, None);
        registry
    }

    fn visit(&mut self, node: &'a TreeNode, parent: Option<usize>) {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.parents.push(parent);
        if let Some((left, right)) = &node.children {
            self.visit(left, Some(id));
            self.visit(right, Some(id));
        }
    }

    /// Locate the node best matching `target`. Priority per node, in
    /// traversal order: core-only text equality, exact text equality; then
    /// a second pass for substring containment.
    fn find_best_node(&self, target: &str) -> Option<usize> {
        let target_core = core_text(target);
        for (id, node) in self.nodes.iter().enumerate() {
            if core_text(&node.text) == target_core {
                return Some(id);
            }
            if node.text == target {
                return Some(id);
            }
        }
        self.nodes.iter().position(|node| node.text.contains(target))
    }

    fn ancestors(&self, mut id: usize) -> Vec<usize> {
        let mut chain = vec![id];
        while let Some(parent) = self.parents[id] {
            chain.push(parent);
            id = parent;
        }
        chain
    }

    /// Distance from the predicate node to the argument node: descendant
    /// depth when the argument sits below the predicate, otherwise the sum
    /// of both paths to the lowest common ancestor.
    fn distance(&self, y_text: &str, x_text: &str) -> Option<usize> {
        let y_id = self.find_best_node(y_text)?;
        let x_id = self.find_best_node(x_text)?;

        let y_chain = self.ancestors(y_id);
        let x_chain = self.ancestors(x_id);

        // X strictly below Y: plain descendant depth.
        if let Some(depth) = x_chain.iter().position(|&a| a == y_id) {
            if depth > 0 {
                return Some(depth);
            }
        }

        let x_depth = x_chain.iter().position(|a| y_chain.contains(a))?;
        let lca = x_chain[x_depth];
        let y_depth = y_chain.iter().position(|&a| a == lca)?;
        Some(y_depth + x_depth)
    }
}

fn core_text(text: &str) -> String {
    for marker in FUNCTIONAL_MARKERS {
        if let Some(stripped) = text.strip_suffix(marker) {
            if stripped.is_empty() {
                break;
            }
            return stripped.to_string();
        }
    }
    text.to_string()
}

/// Per-pattern outcome when a table of patterns runs against one tree.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatternStatus {
    Matched,
    NoMatch,
    Invalid,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternOutcome {
    pub id: String,
    pub pattern: String,
    pub status: PatternStatus,
    pub triples: Vec<Triple>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ExtractionReport {
    pub outcomes: Vec<PatternOutcome>,
    pub triples: Vec<Triple>,
}

/// Run every pattern of a table against one tree. A malformed pattern or a
/// failed match never blocks the remaining patterns.
pub fn run_patterns(
    matcher: &Matcher,
    patterns: &BTreeMap<String, String>,
    tree: &TreeNode,
) -> ExtractionReport {
    let mut report = ExtractionReport::default();
    for (id, raw) in patterns {
        let outcome = match Pattern::compile(raw) {
            Err(e) => {
                warn!(pattern = id.as_str(), error = %e, "skipping malformed pattern");
                PatternOutcome {
                    id: id.clone(),
                    pattern: raw.clone(),
                    status: PatternStatus::Invalid,
                    triples: Vec::new(),
                }
            }
            Ok(pattern) => match matcher.match_pattern(&pattern, &tree.flat_sequence) {
                None => PatternOutcome {
                    id: id.clone(),
                    pattern: raw.clone(),
                    status: PatternStatus::NoMatch,
                    triples: Vec::new(),
                },
                Some(result) => {
                    let triples = extract_triples(&result, &pattern, tree);
                    report.triples.extend(triples.iter().cloned());
                    PatternOutcome {
                        id: id.clone(),
                        pattern: raw.clone(),
                        status: PatternStatus::Matched,
                        triples,
                    }
                }
            },
        };
        report.outcomes.push(outcome);
    }
    report
}
