//! End-to-end preprocessing run: raw directory in, published snapshot out.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    data::{
        loaders::{self, FileShape},
        merge::{self, MasterDataset, MergeStats, SourceBatch},
        normalize::SynonymTable,
        store::{self, ArtifactPaths},
    },
    error::{PipelineError, Result},
};

/// What to do when a single input file cannot be ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileErrorPolicy {
    /// Log the failure, record it in the report and keep going.
    #[default]
    Skip,
    /// Fail the whole run on the first bad file.
    Abort,
}

impl std::str::FromStr for FileErrorPolicy {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown file error policy '{other}'")),
        }
    }
}

/// Inputs for one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub synonyms_path: PathBuf,
    pub on_file_error: FileErrorPolicy,
}

/// Per-file outcome recorded in the run report.
#[derive(Debug, Clone, Serialize)]
pub struct IngestedFile {
    pub source: String,
    pub shape: FileShape,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of a completed run, printed by the CLI and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub finished_at: DateTime<Utc>,
    pub ingested: Vec<IngestedFile>,
    pub failed: Vec<FailedFile>,
    pub stats: MergeStats,
    pub records: usize,
    pub features: usize,
    pub fingerprint: String,
}

/// CSV files directly under `dir`, sorted by file name.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput {
            path: dir.to_path_buf(),
        });
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| PipelineError::Io(err.into()))?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            paths.push(path.to_path_buf());
        }
    }
    Ok(paths)
}

/// Load every input in order, applying the per-file error policy.
pub fn ingest(
    paths: &[PathBuf],
    policy: FileErrorPolicy,
) -> Result<(Vec<SourceBatch>, Vec<IngestedFile>, Vec<FailedFile>)> {
    let mut batches = Vec::with_capacity(paths.len());
    let mut ingested = Vec::new();
    let mut failed = Vec::new();
    for path in paths {
        match loaders::load_file(path) {
            Ok(loaded) => {
                ingested.push(IngestedFile {
                    source: loaded.source.clone(),
                    shape: loaded.shape,
                    rows: loaded.records.len(),
                });
                batches.push(SourceBatch::new(loaded.source, loaded.records));
            }
            Err(err) if err.is_per_file() && policy == FileErrorPolicy::Skip => {
                warn!(path = %path.display(), %err, "skipping unreadable input");
                failed.push(FailedFile {
                    path: path.clone(),
                    error: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok((batches, ingested, failed))
}

/// Build the master dataset in memory without touching the output directory.
pub fn build(
    options: &PipelineOptions,
    synonyms: &SynonymTable,
) -> Result<(MasterDataset, PipelineReport)> {
    let paths = discover_inputs(&options.input_dir)?;
    info!(files = paths.len(), dir = %options.input_dir.display(), "discovered raw inputs");
    let (batches, ingested, failed) = ingest(&paths, options.on_file_error)?;
    let (master, stats) = merge::merge(&batches, synonyms)?;
    let report = PipelineReport {
        finished_at: Utc::now(),
        ingested,
        failed,
        stats,
        records: master.records.len(),
        features: master.index.len(),
        fingerprint: master.index.fingerprint(),
    };
    Ok((master, report))
}

/// Run ingestion, merge and publication. A failed run leaves the previous
/// snapshot in place.
#[instrument(skip(options), fields(input = %options.input_dir.display()))]
pub fn run(options: &PipelineOptions) -> Result<PipelineReport> {
    let synonyms = SynonymTable::load(&options.synonyms_path)?;
    let (master, report) = build(options, &synonyms)?;
    let paths = ArtifactPaths::in_dir(&options.output_dir);
    store::publish(&paths, &master, &report.stats)?;
    info!(
        records = report.records,
        features = report.features,
        failed = report.failed.len(),
        fingerprint = %report.fingerprint,
        "preprocessing complete"
    );
    Ok(report)
}
