//! Parallel-connective synonym dictionary.
//!
//! Loaded once at startup from a JSON array of surface forms and passed
//! explicitly into the matcher; read-only afterwards. Each entry maps to
//! itself, and duplicate entries collapse into the synonym list of the
//! first occurrence.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct ConnectiveDict {
    map: HashMap<String, Vec<String>>,
}

impl ConnectiveDict {
    /// Build from an iterator of surface forms. Empty entries are skipped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            map.entry(entry.to_string())
                .or_default()
                .push(entry.to_string());
        }
        Self { map }
    }

    /// Build from explicit canonical-form groups. The canonical form is
    /// always included in its own synonym list.
    pub fn from_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (canonical, synonyms) in groups {
            let canonical = canonical.as_ref().trim().to_string();
            if canonical.is_empty() {
                continue;
            }
            let list = map.entry(canonical.clone()).or_default();
            if !list.contains(&canonical) {
                list.push(canonical);
            }
            for syn in synonyms {
                let syn = syn.as_ref().trim().to_string();
                if !syn.is_empty() && !list.contains(&syn) {
                    list.push(syn);
                }
            }
        }
        Self { map }
    }

    /// Load from a JSON file holding an array of strings.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Resource(format!("{}: {}", path.display(), e)))?;
        let entries: Vec<String> = serde_json::from_str(&raw)
            .map_err(|e| Error::Resource(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_entries(entries))
    }

    /// True if `a` and `b` are the same form or registered synonyms of each
    /// other. Checked in both directions: `a` as the canonical key with `b`
    /// among its synonyms, and the reverse.
    pub fn synonym_match(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        if let Some(synonyms) = self.map.get(a) {
            if synonyms.iter().any(|s| s == b) {
                return true;
            }
        }
        if let Some(synonyms) = self.map.get(b) {
            if synonyms.iter().any(|s| s == a) {
                return true;
            }
        }
        false
    }

    /// True if `text` appears anywhere in the dictionary, as a canonical key
    /// or as a synonym value.
    pub fn is_connective(&self, text: &str) -> bool {
        if self.map.contains_key(text) {
            return true;
        }
        self.map.values().any(|syns| syns.iter().any(|s| s == text))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
