//! Persisted symptom-to-column mapping that defines the vector layout.

use std::{collections::{BTreeMap, BTreeSet, HashMap}, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{
    data::store,
    error::{PipelineError, Result},
};

/// Immutable bijection between canonical symptoms and column positions.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    columns: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl PartialEq for FeatureIndex {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Eq for FeatureIndex {}

/// On-disk layout of `features.json`.
#[derive(Debug, Serialize, Deserialize)]
struct IndexDocument {
    fingerprint: String,
    features: IndexMap<String, usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredIndex {
    Versioned(IndexDocument),
    Bare(HashMap<String, usize>),
}

impl FeatureIndex {
    /// Build an index from a vocabulary; columns follow sorted order.
    pub fn from_vocabulary<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = vocabulary
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        Self::from_ordered(sorted.into_iter().collect())
    }

    fn from_ordered(columns: Vec<String>) -> Self {
        let lookup = columns
            .iter()
            .enumerate()
            .map(|(idx, symptom)| (symptom.clone(), idx))
            .collect();
        Self { columns, lookup }
    }

    /// Rebuild an index from an explicit mapping, checking it is a bijection
    /// onto `0..len`.
    pub fn from_columns<I>(mapping: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let entries: Vec<(String, usize)> = mapping.into_iter().collect();
        let total = entries.len();
        let by_column: BTreeMap<usize, String> = entries
            .into_iter()
            .map(|(symptom, column)| (column, symptom))
            .collect();
        if by_column.len() != total {
            return Err(PipelineError::InvalidIndex(
                "a column is assigned to more than one symptom".into(),
            ));
        }
        let mut columns = Vec::with_capacity(by_column.len());
        for (expected, (column, symptom)) in by_column.into_iter().enumerate() {
            if column != expected {
                return Err(PipelineError::InvalidIndex(format!(
                    "column {expected} is unassigned (next assigned column is {column})"
                )));
            }
            columns.push(symptom);
        }
        let index = Self::from_ordered(columns);
        if index.lookup.len() != index.columns.len() {
            return Err(PipelineError::InvalidIndex(
                "a symptom is mapped to more than one column".into(),
            ));
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, symptom: &str) -> Option<usize> {
        self.lookup.get(symptom).copied()
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.lookup.contains_key(symptom)
    }

    /// Symptom occupying a column.
    pub fn symptom(&self, column: usize) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Symptoms in column order.
    pub fn symptoms(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(String::as_str)
    }

    /// Hex SHA-256 over the column-ordered vocabulary.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for symptom in &self.columns {
            hasher.update(symptom.as_bytes());
            hasher.update([b'\n']);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Serialise to the durable JSON form.
    pub fn to_json(&self) -> Result<String> {
        let doc = IndexDocument {
            fingerprint: self.fingerprint(),
            features: self
                .columns
                .iter()
                .enumerate()
                .map(|(idx, symptom)| (symptom.clone(), idx))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Parse the durable JSON form. A bare `{symptom: column}` object is accepted.
    pub fn from_json(text: &str) -> Result<Self> {
        match serde_json::from_str::<StoredIndex>(text)? {
            StoredIndex::Versioned(doc) => {
                let index = Self::from_columns(doc.features)?;
                let actual = index.fingerprint();
                if actual != doc.fingerprint {
                    return Err(PipelineError::InvalidIndex(format!(
                        "fingerprint {} does not match vocabulary {actual}",
                        doc.fingerprint
                    )));
                }
                Ok(index)
            }
            StoredIndex::Bare(mapping) => Self::from_columns(mapping),
        }
    }

    /// Atomically replace the index file at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        store::write_atomic(path, self.to_json()?.as_bytes())?;
        info!(path = %path.display(), features = self.len(), "wrote feature index");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
