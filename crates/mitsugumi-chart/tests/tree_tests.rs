use mitsugumi_chart::{
    build, canonical_tree, enrich, enumerate_trees, expand_by_tree_id, expand_from_cell, Chart,
    Color, TableClassifier,
};
use mitsugumi_core::error::Error;
use mitsugumi_core::normalize::{normalize_units, RawBunsetsu};
use mitsugumi_core::types::{MorphKind, Span, Unit};

fn taro_reads_a_book() -> Vec<Unit> {
    let raw: Vec<RawBunsetsu> = serde_json::from_str(
        r#"[
            {"bunsetu": [
                {"text": "太郎", "pos": "PROPN", "type": "core"},
                {"text": "は", "pos": "ADP", "type": "func"}
            ]},
            {"bunsetu": [
                {"text": "本", "pos": "NOUN", "type": "core"},
                {"text": "を", "pos": "ADP", "type": "func"}
            ]},
            {"bunsetu": [
                {"text": "読む", "pos": "VERB", "type": "core"}
            ]}
        ]"#,
    )
    .expect("fixture parses");
    normalize_units(&raw)
}

async fn enriched(units: &[Unit], table: &TableClassifier) -> Chart {
    let mut chart = build(units).expect("build");
    enrich(&mut chart, table).await.expect("enrich");
    chart
}

fn combine_table() -> TableClassifier {
    TableClassifier::with_default(1, 1.0)
}

#[test]
fn canonical_tree_resolves_first_splits() {
    let units = taro_reads_a_book();
    let chart = build(&units).expect("build");
    let root = canonical_tree(&chart, &units, chart.root_span()).expect("tree");

    assert_eq!(root.span, Span::new(0, 2));
    assert_eq!(root.text, "太郎は本を読む");
    assert!(!root.is_terminal);
    let (left, right) = root.children.as_ref().expect("root has children");
    assert_eq!(left.span, Span::new(0, 0));
    assert!(left.is_terminal);
    assert_eq!(right.span, Span::new(1, 2));
    let (mid_left, mid_right) = right.children.as_ref().expect("mid has children");
    assert_eq!(mid_left.span, Span::new(1, 1));
    assert_eq!(mid_right.span, Span::new(2, 2));
}

#[test]
fn merge_smoothing_flips_only_sandwiched_func_leaves() {
    let units = taro_reads_a_book();
    let chart = build(&units).expect("build");
    let root = canonical_tree(&chart, &units, chart.root_span()).expect("tree");

    let (left, right) = root.children.as_ref().expect("children");
    // Leaf of width 1: "太郎"+"は" has no interior position, は stays func.
    assert_eq!(left.flat_sequence[1].kind, MorphKind::Func);
    // In the (1,2) merge, を sits between 本 and 読む and flips to core.
    assert_eq!(right.flat_sequence[1].text, "を");
    assert_eq!(right.flat_sequence[1].kind, MorphKind::Core);
    // At the root merge the seam token は gets core on both sides and flips too.
    assert!(root.flat_sequence.iter().all(|t| t.kind == MorphKind::Core));
}

#[tokio::test]
async fn expansion_stops_below_negative_decisions() {
    let units = taro_reads_a_book();
    // Root split 0 combines; everything else does not.
    let mut table = TableClassifier::with_default(0, 0.7);
    table.insert("太郎は", "本を読む", 1, 0.9);
    let chart = enriched(&units, &table).await;

    let expansion = expand_from_cell(&chart, &units, Span::new(0, 2), 1).expect("expand");
    assert!(!expansion.is_terminal);
    assert_eq!(expansion.trees.len(), 2, "one tree per split of the cell");

    let first = &expansion.trees[0];
    assert_eq!(first.decision, Some(1));
    assert_eq!(first.color, Color::Green);
    let (left, right) = first.tree.children.as_ref().expect("children");
    assert!(left.is_terminal);
    assert_eq!(left.color, Color::Gray);
    // (1,2) is splittable, but its own split decision is 0: leaf by decision.
    assert!(!right.is_terminal);
    assert!(right.is_leaf_due_to_pred);
    assert_eq!(right.decision, Some(0));
    assert_eq!(right.color, Color::Red);
    assert!(right.children.is_none());

    let second = &expansion.trees[1];
    assert_eq!(second.decision, Some(0));
    assert_eq!(second.color, Color::Red);
    // The requested cell's own splits always materialize children; the
    // negative decision gates the levels below.
    let (left2, _) = second.tree.children.as_ref().expect("children");
    assert!(left2.is_leaf_due_to_pred);
    assert!(left2.children.is_none());
}

#[tokio::test]
async fn expanding_a_terminal_cell_yields_no_trees() {
    let units = taro_reads_a_book();
    let chart = enriched(&units, &combine_table()).await;
    let expansion = expand_from_cell(&chart, &units, Span::new(1, 1), 1).expect("expand");
    assert!(expansion.is_terminal);
    assert!(expansion.trees.is_empty());
}

#[tokio::test]
async fn expand_by_tree_id_resolves_the_enrichment_address() {
    let units = taro_reads_a_book();
    let chart = enriched(&units, &combine_table()).await;

    let expansion = expand_by_tree_id(&chart, &units, "1", 1).expect("expand");
    assert_eq!(expansion.root_span, Span::new(0, 2));
    assert_eq!(expansion.root_decision, Some(1));
    // Root split 1 divides after 本を; the left side opens through (0,1).
    let (left, right) = expansion.tree.children.as_ref().expect("children");
    assert_eq!(left.span, Span::new(0, 1));
    assert!(left.children.is_some());
    assert_eq!(right.span, Span::new(2, 2));
    assert!(expansion.expanded_spans.contains(&Span::new(0, 2)));
    assert!(expansion.leaf_spans.contains(&Span::new(2, 2)));

    match expand_by_tree_id(&chart, &units, "no-such-id", 1) {
        Err(Error::TreeIdNotFound(id)) => assert_eq!(id, "no-such-id"),
        other => panic!("expected TreeIdNotFound, got {:?}", other.map(|e| e.tree_id)),
    }
}

#[tokio::test]
async fn enumeration_with_no_positive_decisions_yields_one_tree() {
    let units = taro_reads_a_book();
    let chart = enriched(&units, &TableClassifier::with_default(0, 0.5)).await;

    let result = enumerate_trees(&chart, &units, Span::new(0, 2), 64).expect("enumerate");
    assert_eq!(result.trees.len(), 1, "no branching without positive decisions");
    assert!(!result.truncated);
    let only = &result.trees[0];
    assert!(only.is_leaf_due_to_pred);
    assert!(only.children.is_none());
}

#[tokio::test]
async fn enumeration_branches_over_every_positive_bracketing() {
    let units = taro_reads_a_book();
    let chart = enriched(&units, &combine_table()).await;

    let result = enumerate_trees(&chart, &units, Span::new(0, 2), 64).expect("enumerate");
    // Three units have exactly two bracketings when every split combines.
    assert_eq!(result.trees.len(), 2);
    assert!(!result.truncated);
    for tree in &result.trees {
        assert_eq!(tree.decision, Some(1));
        assert!(tree.children.is_some());
    }
}

#[tokio::test]
async fn enumeration_cap_is_reported_not_silent() {
    let units = taro_reads_a_book();
    let chart = enriched(&units, &combine_table()).await;

    let result = enumerate_trees(&chart, &units, Span::new(0, 2), 1).expect("enumerate");
    assert_eq!(result.trees.len(), 1);
    assert!(result.truncated);
}

#[tokio::test]
async fn enumerating_a_missing_cell_is_cell_not_found() {
    let units = taro_reads_a_book();
    let chart = enriched(&units, &combine_table()).await;
    match enumerate_trees(&chart, &units, Span::new(0, 9), 64) {
        Err(Error::CellNotFound { span }) => assert_eq!(span, Span::new(0, 9)),
        other => panic!("expected CellNotFound, got {:?}", other.map(|e| e.trees.len())),
    }
}
