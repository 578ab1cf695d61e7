//! Pattern template compiler.
//!
//! Templates mix bracketed slot expressions with literal characters:
//! `"[X1]は[X2]を[Y1]"`. A slot may carry a `*N` prefix (resolve against an
//! ancestor N levels up) and a `-TAG` suffix (extra constraint on the bound
//! text). `&` outside brackets is the wildcard-connective token; every other
//! non-bracket character compiles to one literal token.
//!
//! Slot names are case-sensitive. Names starting with `Y` are
//! predicate-role slots and names starting with `X` are argument-role
//! slots; triple extraction depends on that convention.

use mitsugumi_core::error::{Error, Result};

/// The only slot tag constraint currently recognized: the bound text must
/// be compatible with verbal-noun (サ変) conjugation.
pub const VERBAL_NOUN_TAG: &str = "サ変";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    Slot {
        name: String,
        tag: Option<String>,
        parent_depth: usize,
    },
    Literal(char),
    WildcardConnective,
}

/// A compiled, immutable pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    tokens: Vec<PatternToken>,
}

impl Pattern {
    pub fn compile(raw: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            match c {
                '[' => {
                    let mut content = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        match inner {
                            ']' => {
                                closed = true;
                                break;
                            }
                            '[' => {
                                return Err(Error::MalformedPattern(format!(
                                    "nested '[' in '{raw}'"
                                )))
                            }
                            other => content.push(other),
                        }
                    }
                    if !closed {
                        return Err(Error::MalformedPattern(format!(
                            "unbalanced '[' in '{raw}'"
                        )));
                    }
                    tokens.push(parse_slot(&content, raw)?);
                }
                ']' => {
                    return Err(Error::MalformedPattern(format!("unbalanced ']' in '{raw}'")))
                }
                '&' => tokens.push(PatternToken::WildcardConnective),
                other => tokens.push(PatternToken::Literal(other)),
            }
        }
        if tokens.is_empty() {
            return Err(Error::MalformedPattern("empty pattern".to_string()));
        }
        Ok(Self { raw: raw.to_string(), tokens })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Slot names with their parent depth, in template order, first
    /// occurrence wins.
    pub fn slots(&self) -> Vec<(&str, usize)> {
        let mut out: Vec<(&str, usize)> = Vec::new();
        for token in &self.tokens {
            if let PatternToken::Slot { name, parent_depth, .. } = token {
                if !out.iter().any(|(n, _)| n == name) {
                    out.push((name.as_str(), *parent_depth));
                }
            }
        }
        out
    }
}

fn parse_slot(content: &str, raw: &str) -> Result<PatternToken> {
    if content.is_empty() {
        return Err(Error::MalformedPattern(format!("empty slot in '{raw}'")));
    }
    let mut rest = content;
    let mut parent_depth = 0;
    if let Some(stripped) = rest.strip_prefix('*') {
        let digits: String = stripped.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(Error::MalformedPattern(format!(
                "'*' without a depth in '{raw}'"
            )));
        }
        parent_depth = digits
            .parse()
            .map_err(|e| Error::MalformedPattern(format!("bad depth in '{raw}': {e}")))?;
        rest = &stripped[digits.len()..];
    }
    let (name, tag) = match rest.split_once('-') {
        Some((name, tag)) => (name, Some(tag.to_string())),
        None => (rest, None),
    };
    if name.is_empty() {
        return Err(Error::MalformedPattern(format!("slot without a name in '{raw}'")));
    }
    Ok(PatternToken::Slot { name: name.to_string(), tag, parent_depth })
}
