use async_trait::async_trait;

use mitsugumi_chart::{
    build, enrich, Chart, Prediction, SplitClassifier, SplitPair, StubClassifier, TableClassifier,
};
use mitsugumi_core::normalize::{normalize_units, RawBunsetsu};
use mitsugumi_core::types::{Span, Unit};

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

fn collect_tree_ids(chart: &Chart) -> Vec<(Span, usize, String)> {
    let mut ids = Vec::new();
    for cell in chart.cells() {
        for split in &cell.splits {
            ids.push((
                cell.span,
                split.split_idx,
                split.tree_id.clone().expect("every split gets a tree id"),
            ));
        }
    }
    ids
}

#[tokio::test]
async fn enrich_writes_back_every_verdict() {
    let units = taro_reads_a_book();
    let mut chart = build(&units).expect("build");
    let stats = enrich(&mut chart, &StubClassifier::combine_all()).await.expect("enrich");

    assert_eq!(stats.pairs, 4, "n=3 chart has 4 splits");
    assert_eq!(stats.positive, 4);
    assert_eq!(stats.negative, 0);
    for cell in chart.cells() {
        for split in &cell.splits {
            assert_eq!(split.decision, Some(1));
            assert_eq!(split.confidence, Some(1.0));
        }
    }
}

#[tokio::test]
async fn table_classifier_pins_individual_pairs() {
    let units = taro_reads_a_book();
    let mut chart = build(&units).expect("build");

    let mut table = TableClassifier::with_default(0, 0.5);
    table.insert("太郎は", "本を読む", 1, 0.9);
    enrich(&mut chart, &table).await.expect("enrich");

    let root = chart.cell(Span::new(0, 2)).expect("root");
    assert_eq!(root.splits[0].decision, Some(1));
    assert_eq!(root.splits[0].confidence, Some(0.9));
    assert_eq!(root.splits[1].decision, Some(0));
    assert_eq!(root.splits[1].confidence, Some(0.5));
}

#[tokio::test]
async fn tree_ids_follow_the_right_descending_walk() {
    let units = taro_reads_a_book();
    let mut chart = build(&units).expect("build");
    enrich(&mut chart, &StubClassifier::combine_all()).await.expect("enrich");

    let root = chart.cell(Span::new(0, 2)).expect("root");
    assert_eq!(root.splits[0].tree_id.as_deref(), Some("0"));
    assert_eq!(root.splits[1].tree_id.as_deref(), Some("1"));

    // Right child of root split 0 is (1,2); its single split sits on path "0".
    let mid = chart.cell(Span::new(1, 2)).expect("cell");
    assert_eq!(mid.splits[0].tree_id.as_deref(), Some("0-0"));

    // (0,1) is only ever a left child, so it gets the positional fallback.
    let left = chart.cell(Span::new(0, 1)).expect("cell");
    assert_eq!(left.splits[0].tree_id.as_deref(), Some("(0,1)-0"));
}

#[tokio::test]
async fn tree_ids_are_reproducible_across_enrichment_runs() {
    let units = taro_reads_a_book();

    let mut first = build(&units).expect("build");
    enrich(&mut first, &StubClassifier::combine_all()).await.expect("enrich");

    let mut second = build(&units).expect("build");
    enrich(&mut second, &StubClassifier::combine_all()).await.expect("enrich");

    assert_eq!(collect_tree_ids(&first), collect_tree_ids(&second));
}

struct ShortClassifier;

#[async_trait]
impl SplitClassifier for ShortClassifier {
    fn classifier_id(&self) -> &str {
        "stub:short"
    }

    async fn classify_batch(&self, pairs: &[SplitPair]) -> anyhow::Result<Vec<Prediction>> {
        Ok(vec![Prediction { decision: 1, confidence: 1.0 }; pairs.len().saturating_sub(1)])
    }
}

#[tokio::test]
async fn misaligned_classifier_response_is_an_error() {
    let units = taro_reads_a_book();
    let mut chart = build(&units).expect("build");
    let err = enrich(&mut chart, &ShortClassifier).await.expect_err("must fail");
    assert!(err.to_string().contains("predictions"));
}
