//! Fold per-source raw records into the deduplicated master dataset.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    data::{
        loaders::RawRecord,
        normalize::{canonicalize, clean_disease, SynonymTable},
    },
    error::{PipelineError, Result},
    features::index::FeatureIndex,
};

/// Raw records from one source, in row order.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: String,
    pub records: Vec<RawRecord>,
}

impl SourceBatch {
    pub fn new(source: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }
}

/// A cleaned record: disease name via [`clean_disease`], symptoms synonym-resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub disease: String,
    pub symptoms: BTreeSet<String>,
    pub source: String,
}

impl CanonicalRecord {
    /// Content key used for deduplication; the source does not participate.
    pub fn signature(&self) -> RecordSignature {
        RecordSignature {
            disease: self.disease.clone(),
            symptoms: self.symptoms.iter().cloned().collect(),
        }
    }
}

/// Disease plus its sorted symptoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordSignature {
    pub disease: String,
    pub symptoms: Vec<String>,
}

/// Deduplicated records together with the vocabulary they define.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterDataset {
    pub records: Vec<CanonicalRecord>,
    pub index: FeatureIndex,
}

/// Per-source counters for one merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    pub rows: usize,
    pub kept: usize,
}

/// Counters produced by one merge run. Owned by the caller of [`merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub duplicates_dropped: usize,
    pub empty_disease_dropped: usize,
    pub sources: IndexMap<String, SourceStats>,
    pub symptom_counts: BTreeMap<String, usize>,
}

impl MergeStats {
    fn record_kept(&mut self, record: &CanonicalRecord) {
        self.rows_kept += 1;
        self.sources.entry(record.source.clone()).or_default().kept += 1;
        for symptom in &record.symptoms {
            *self.symptom_counts.entry(symptom.clone()).or_insert(0) += 1;
        }
    }
}

/// Clean a single raw record. Returns `None` when no disease name survives.
pub fn canonicalize_record(
    raw: &RawRecord,
    source: &str,
    synonyms: &SynonymTable,
) -> Option<CanonicalRecord> {
    let disease = clean_disease(&raw.disease);
    if disease.is_empty() {
        return None;
    }
    let symptoms = raw
        .symptoms
        .iter()
        .map(|s| canonicalize(s, synonyms))
        .filter(|s| !s.is_empty())
        .collect();
    Some(CanonicalRecord {
        disease,
        symptoms,
        source: source.to_string(),
    })
}

/// Merge batches in the given order and derive the feature index.
///
/// The first record seen for a signature is kept; later copies are dropped,
/// whichever source they come from.
pub fn merge(batches: &[SourceBatch], synonyms: &SynonymTable) -> Result<(MasterDataset, MergeStats)> {
    let mut stats = MergeStats::default();
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for batch in batches {
        stats
            .sources
            .entry(batch.source.clone())
            .or_default()
            .rows += batch.records.len();
        for raw in &batch.records {
            stats.rows_seen += 1;
            let Some(record) = canonicalize_record(raw, &batch.source, synonyms) else {
                stats.empty_disease_dropped += 1;
                continue;
            };
            if !seen.insert(record.signature()) {
                stats.duplicates_dropped += 1;
                continue;
            }
            stats.record_kept(&record);
            records.push(record);
        }
    }

    if stats.empty_disease_dropped > 0 {
        warn!(
            dropped = stats.empty_disease_dropped,
            "dropped rows without a disease name"
        );
    }

    let vocabulary: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.symptoms.iter().map(String::as_str))
        .collect();
    if vocabulary.is_empty() {
        return Err(PipelineError::EmptyVocabulary {
            records: records.len(),
        });
    }
    let index = FeatureIndex::from_vocabulary(vocabulary);

    info!(
        rows = stats.rows_seen,
        kept = stats.rows_kept,
        duplicates = stats.duplicates_dropped,
        features = index.len(),
        "merged master dataset"
    );
    Ok((MasterDataset { records, index }, stats))
}
