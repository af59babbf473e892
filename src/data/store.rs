//! Snapshot persistence for the master dataset and its companions.

use std::{
    collections::BTreeSet,
    io::Write,
    path::{Path, PathBuf},
};

use atomicwrites::{AtomicFile, OverwriteBehavior};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    data::merge::{CanonicalRecord, MasterDataset, MergeStats},
    error::{PipelineError, Result},
    features::index::FeatureIndex,
};

pub const MASTER_FILE: &str = "master_dataset.csv";
pub const FEATURES_FILE: &str = "features.json";
pub const STATS_FILE: &str = "merge_stats.json";

/// Separator for the symptom set inside one CSV cell. Never survives normalisation.
pub const SYMPTOM_SEPARATOR: char = '|';

#[derive(Debug, Serialize, Deserialize)]
struct MasterRow {
    disease: String,
    symptoms: String,
    source: String,
}

/// Replace `path` with `bytes` via a temporary file and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|file| file.write_all(bytes))
        .map_err(|err| match err {
            atomicwrites::Error::Internal(err) | atomicwrites::Error::User(err) => err,
        })
}

/// Output locations inside a processed directory.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub master: PathBuf,
    pub features: PathBuf,
    pub stats: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            master: dir.join(MASTER_FILE),
            features: dir.join(FEATURES_FILE),
            stats: dir.join(STATS_FILE),
        }
    }
}

/// Serialise records as `disease,symptoms,source` CSV.
pub fn master_to_csv(records: &[CanonicalRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        let symptoms = record
            .symptoms
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(&SYMPTOM_SEPARATOR.to_string());
        writer
            .serialize(MasterRow {
                disease: record.disease.clone(),
                symptoms,
                source: record.source.clone(),
            })
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|err| PipelineError::Io(err.into_error()))
}

/// Parse the master CSV back into records.
pub fn master_from_csv<R: std::io::Read>(reader: R) -> Result<Vec<CanonicalRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in reader.deserialize::<MasterRow>() {
        let row = row.map_err(csv_error)?;
        let symptoms: BTreeSet<String> = row
            .symptoms
            .split(SYMPTOM_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        records.push(CanonicalRecord {
            disease: row.disease,
            symptoms,
            source: row.source,
        });
    }
    Ok(records)
}

fn csv_error(err: csv::Error) -> PipelineError {
    PipelineError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

/// Serialise every artifact first, then replace each file atomically.
///
/// Any serialisation failure happens before the first file is touched.
pub fn publish(paths: &ArtifactPaths, master: &MasterDataset, stats: &MergeStats) -> Result<()> {
    let master_bytes = master_to_csv(&master.records)?;
    let index_text = master.index.to_json()?;
    let stats_text = serde_json::to_string_pretty(stats)?;

    write_atomic(&paths.master, &master_bytes)?;
    write_atomic(&paths.features, index_text.as_bytes())?;
    write_atomic(&paths.stats, stats_text.as_bytes())?;
    info!(
        master = %paths.master.display(),
        features = %paths.features.display(),
        records = master.records.len(),
        "published master dataset"
    );
    Ok(())
}

/// Load the master records and index written by [`publish`].
pub fn load_master(paths: &ArtifactPaths) -> Result<MasterDataset> {
    if !paths.master.exists() {
        return Err(PipelineError::MissingInput {
            path: paths.master.clone(),
        });
    }
    let records = master_from_csv(std::fs::File::open(&paths.master)?)?;
    let index = FeatureIndex::load(&paths.features)?;
    info!(records = records.len(), features = index.len(), "loaded master dataset");
    Ok(MasterDataset { records, index })
}
