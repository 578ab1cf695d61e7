#![deny(warnings)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod matcher;
pub mod pattern;
pub mod triples;

pub use matcher::{MatchResult, Matcher, SlotBinding};
pub use pattern::{Pattern, PatternToken, VERBAL_NOUN_TAG};
pub use triples::{
    extract_triples, run_patterns, ExtractionReport, PatternOutcome, PatternStatus, Triple,
    PLACEHOLDER_SUBJECT,
};
