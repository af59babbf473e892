//! Text normalisation, disease-name cleaning and symptom synonym canonicalisation.

use std::{collections::HashMap, path::Path};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::error::{PipelineError, Result};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static UNSUPPORTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9,.;:/\-() ]+").expect("valid regex"));

const DISEASE_SUFFIX: &str = "disease";

/// Lowercase, collapse whitespace, drop unsupported characters and trim.
pub fn normalize_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let collapsed = WHITESPACE.replace_all(&lower, " ");
    let kept = UNSUPPORTED.replace_all(&collapsed, "");
    kept.trim().to_string()
}

/// Absent cells normalise to the empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize_text).unwrap_or_default()
}

/// Disease names drop the literal word `disease` after normalisation.
pub fn clean_disease(name: &str) -> String {
    normalize_text(name)
        .replace(DISEASE_SUFFIX, "")
        .trim()
        .to_string()
}

/// Canonical name to alias mapping, kept in configuration order.
///
/// Keys and aliases are normalised on construction. When an alias appears under
/// more than one canonical entry the earliest entry wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynonymTable {
    entries: IndexMap<String, Vec<String>>,
    lookup: HashMap<String, String>,
}

impl SynonymTable {
    pub fn new<I, K, A, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, A)>,
        K: AsRef<str>,
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = IndexMap::<String, Vec<String>>::new();
        for (canonical, aliases) in entries {
            let key = normalize_text(canonical.as_ref());
            if key.is_empty() {
                continue;
            }
            let slot = table.entry(key).or_default();
            for alias in aliases {
                let alias = normalize_text(alias.as_ref());
                if !alias.is_empty() && !slot.contains(&alias) {
                    slot.push(alias);
                }
            }
        }

        let mut lookup = HashMap::new();
        for (canonical, aliases) in &table {
            lookup
                .entry(canonical.clone())
                .or_insert_with(|| canonical.clone());
            for alias in aliases {
                lookup
                    .entry(alias.clone())
                    .or_insert_with(|| canonical.clone());
            }
        }

        Self {
            entries: table,
            lookup,
        }
    }

    /// Parse a JSON object of the form `{"canonical": ["alias", ...]}`.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let raw: IndexMap<String, Vec<String>> = serde_json::from_str(text)?;
        Ok(Self::new(raw))
    }

    /// Load the synonym resource from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let table = Self::from_json(&text).map_err(|err| PipelineError::InvalidSynonyms {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        info!(path = %path.display(), entries = table.len(), "loaded synonym table");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an already normalised token.
    pub fn resolve(&self, normalized: &str) -> Option<&str> {
        self.lookup.get(normalized).map(String::as_str)
    }

    pub fn aliases(&self, canonical: &str) -> Option<&[String]> {
        self.entries.get(canonical).map(Vec::as_slice)
    }
}

/// Normalise a symptom token and map it to its canonical name.
///
/// Unknown tokens pass through as their own canonical form.
pub fn canonicalize(token: &str, synonyms: &SynonymTable) -> String {
    let normalized = normalize_text(token);
    match synonyms.resolve(&normalized) {
        Some(canonical) => canonical.to_string(),
        None => normalized,
    }
}
