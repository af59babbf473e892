//! Runtime configuration utilities for symptom-pipeline.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::pipeline::FileErrorPolicy;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Folder scanned for raw `*.csv` datasets.
    pub raw_dir: PathBuf,
    /// Folder holding the published master dataset and feature index.
    pub processed_dir: PathBuf,
    /// JSON synonym resource.
    pub synonyms_path: PathBuf,
    /// Folder for trained models and matrix exports.
    pub model_dir: PathBuf,
    /// Behaviour when a single raw file cannot be ingested.
    pub on_file_error: FileErrorPolicy,
    /// Number of ranked conditions reported by default.
    pub top_k: usize,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let raw_dir = env_path("RAW_DIR", "./data/raw");
        let processed_dir = env_path("PROCESSED_DIR", "./data/processed");
        let synonyms_path = env_path("SYNONYMS_PATH", "./data/synonyms.json");
        let model_dir = env_path("MODEL_DIR", "./data/model");
        let on_file_error = match env::var("ON_FILE_ERROR") {
            Ok(value) => value.parse::<FileErrorPolicy>().map_err(|err| anyhow!(err))?,
            Err(_) => FileErrorPolicy::default(),
        };
        let top_k = env::var("TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        std::fs::create_dir_all(&processed_dir).context("creating processed dir")?;
        std::fs::create_dir_all(&model_dir).context("creating model dir")?;

        Ok(Self {
            raw_dir,
            processed_dir,
            synonyms_path,
            model_dir,
            on_file_error,
            top_k,
        })
    }

    /// Convenience helper for derived processed-artifact paths.
    pub fn join_processed<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.processed_dir.join(path)
    }

    /// Convenience helper for derived model paths.
    pub fn join_model<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.model_dir.join(path)
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
