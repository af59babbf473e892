//! Error taxonomy shared by ingestion, merge and serving stages.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::data::loaders::FileShape;

/// Failures surfaced by the preprocessing pipeline and the vector contract.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unreadable file {path:?} (shape: {shape}): {reason}")]
    UnreadableFile {
        path: PathBuf,
        shape: ShapeHint,
        reason: String,
    },
    #[error("no disease column could be resolved in {path:?}")]
    UnresolvableSchema { path: PathBuf },
    #[error("merge produced an empty vocabulary ({records} records survived)")]
    EmptyVocabulary { records: usize },
    #[error("required input {path:?} does not exist")]
    MissingInput { path: PathBuf },
    #[error("synonym table {path:?} is invalid: {reason}")]
    InvalidSynonyms { path: PathBuf, reason: String },
    #[error("feature index is invalid: {0}")]
    InvalidIndex(String),
    #[error("model was trained against index {expected} but index {actual} is published")]
    StaleIndex { expected: String, actual: String },
    #[error("vector has {actual} columns, classifier expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Reasons a delimited file cannot be turned into a [`Table`](crate::data::loaders::Table).
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("line {line} has {found} fields but the header has {expected}")]
    TooManyFields {
        line: u64,
        found: usize,
        expected: usize,
    },
}

/// Shape context attached to per-file failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeHint {
    Detected(FileShape),
    Undetected,
}

impl std::fmt::Display for ShapeHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detected(shape) => write!(f, "{shape}"),
            Self::Undetected => f.write_str("undetected"),
        }
    }
}

impl PipelineError {
    pub(crate) fn unreadable(
        path: &std::path::Path,
        shape: ShapeHint,
        reason: impl ToString,
    ) -> Self {
        Self::UnreadableFile {
            path: path.to_path_buf(),
            shape,
            reason: reason.to_string(),
        }
    }

    /// Per-file errors may be skipped by the caller; everything else ends the run.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::UnreadableFile { .. } | Self::UnresolvableSchema { .. }
        )
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
