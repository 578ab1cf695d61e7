use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use mitsugumi_chart::{
    build, enrich, enumerate_trees, expand_by_tree_id, expand_from_cell, HttpClassifier,
    SplitClassifier, StubClassifier, DEFAULT_MAX_TREES, DEFAULT_PRED_THRESHOLD,
};
use mitsugumi_core::config::Config;
use mitsugumi_core::normalize::{normalize_units, RawBunsetsu};
use mitsugumi_core::types::Span;

enum Mode {
    Expand(Span),
    ExpandId(String),
    Enumerate(Span),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut input = None;
    let mut mode = None;
    let mut threshold = DEFAULT_PRED_THRESHOLD;
    let mut max_trees = DEFAULT_MAX_TREES;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--cell" | "--enumerate" if i + 2 < args.len() => {
                let span = Span::new(args[i + 1].parse()?, args[i + 2].parse()?);
                mode = Some(if args[i] == "--cell" { Mode::Expand(span) } else { Mode::Enumerate(span) });
                i += 2;
            }
            "--tree-id" if i + 1 < args.len() => { mode = Some(Mode::ExpandId(args[i + 1].clone())); i += 1; }
            "--threshold" if i + 1 < args.len() => { threshold = args[i + 1].parse()?; i += 1; }
            "--max-trees" if i + 1 < args.len() => { max_trees = args[i + 1].parse()?; i += 1; }
            _ if !args[i].starts_with('-') => input = Some(PathBuf::from(&args[i])),
            other => { eprintln!("Unknown or incomplete argument: {}", other); std::process::exit(1); }
        }
        i += 1;
    }
    let input = input.ok_or_else(|| {
        anyhow::anyhow!(
            "usage: mitsugumi-trees <segments.json> (--cell I J | --tree-id ID | --enumerate I J) \
             [--threshold N] [--max-trees N]"
        )
    })?;
    let mode = mode.ok_or_else(|| anyhow::anyhow!("pick one of --cell, --tree-id, --enumerate"))?;

    let raw: Vec<RawBunsetsu> = serde_json::from_str(&std::fs::read_to_string(&input)?)?;
    let units = normalize_units(&raw);

    let classifier = build_classifier(&config)?;
    let mut chart = build(&units)?;
    tokio::runtime::Runtime::new()?.block_on(enrich(&mut chart, classifier.as_ref()))?;

    let out = match mode {
        Mode::Expand(span) => {
            serde_json::to_string_pretty(&expand_from_cell(&chart, &units, span, threshold)?)?
        }
        Mode::ExpandId(id) => {
            serde_json::to_string_pretty(&expand_by_tree_id(&chart, &units, &id, threshold)?)?
        }
        Mode::Enumerate(span) => {
            let result = enumerate_trees(&chart, &units, span, max_trees)?;
            if result.truncated {
                eprintln!("warning: enumeration truncated at {} trees", max_trees);
            }
            serde_json::to_string_pretty(&result)?
        }
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
        Err(_) => Ok(Box::new(StubClassifier::combine_all())),
    }
}
