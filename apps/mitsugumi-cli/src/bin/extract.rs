use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use mitsugumi_chart::{build, canonical_tree, enrich, HttpClassifier, SplitClassifier, StubClassifier};
use mitsugumi_core::config::Config;
use mitsugumi_core::connectives::ConnectiveDict;
use mitsugumi_core::normalize::{normalize_units, RawBunsetsu};
use mitsugumi_match::{run_patterns, Matcher};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut input = None; let mut pretty = false;
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--pretty" | "-p" => pretty = true,
        _ if !args[i].starts_with('-') => input = Some(PathBuf::from(&args[i])), _ => {} } i += 1; }
    let input = input.ok_or_else(|| anyhow::anyhow!("usage: mitsugumi-extract [--pretty] <segments.json>"))?;

    // Sentences are the segmenter's JSON output: either one sentence
    // (array of bunsetsu) or an array of sentences.
    let raw = std::fs::read_to_string(&input)?;
    let sentences: Vec<Vec<RawBunsetsu>> = match serde_json::from_str(&raw) {
        Ok(many) => many,
        Err(_) => vec![serde_json::from_str(&raw)?],
    };

    let connectives_path: String = config
        .get("resources.connectives_path")
        .unwrap_or_else(|_| "resources/connectives.json".to_string());
    let patterns_path: String = config
        .get("resources.patterns_path")
        .unwrap_or_else(|_| "resources/patterns.json".to_string());

    let connectives = ConnectiveDict::load(&mitsugumi_core::config::expand_path(&connectives_path))?;
    let patterns: BTreeMap<String, String> = serde_json::from_str(&std::fs::read_to_string(
        mitsugumi_core::config::expand_path(&patterns_path),
    )?)?;
    let matcher = Matcher::new(connectives);

    let classifier = build_classifier(&config)?;
    println!("Classifier: {}", classifier.classifier_id());
    println!("Patterns:   {}", patterns.len());

    let runtime = tokio::runtime::Runtime::new()?;
    let pb = ProgressBar::new(sentences.len() as u64);
    pb.set_style(ProgressStyle::with_template("{bar:30} {pos}/{len} sentences")?);

    let mut results = Vec::new();
    for sentence in &sentences {
        // One sentence failing must not block the rest of the batch.
        let result = (|| -> anyhow::Result<serde_json::Value> {
            let units = normalize_units(sentence);
            let mut chart = build(&units)?;
            let stats = runtime.block_on(enrich(&mut chart, classifier.as_ref()))?;
            let tree = canonical_tree(&chart, &units, chart.root_span())?;
            let report = run_patterns(&matcher, &patterns, &tree);
            Ok(json!({
                "text": tree.text,
                "chart": chart.stats(),
                "splits": { "scored": stats.pairs, "positive": stats.positive, "negative": stats.negative },
                "outcomes": report.outcomes,
                "triples": report.triples,
            }))
        })();
        match result {
            Ok(value) => results.push(value),
            Err(e) => {
                tracing::warn!(error = %e, "sentence skipped");
                results.push(json!({ "error": e.to_string() }));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let out = if pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    println!("{}", out);
    Ok(())
}

fn build_classifier(config: &Config) -> anyhow::Result<Box<dyn SplitClassifier>> {
    match config.get::<String>("classifier.endpoint") {
        Ok(endpoint) => {
            let timeout = config.get::<u64>("classifier.timeout_secs").unwrap_or(30);
            Ok(Box::new(HttpClassifier::new(endpoint, Duration::from_secs(timeout))?))
        }
        Err(_) => {
            println!("No classifier endpoint configured; using the fixed stub");
            Ok(Box::new(StubClassifier::combine_all()))
        }
    }
}
