//! CLI entry-point for the preprocessing pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    pipeline::{self, FileErrorPolicy, PipelineOptions},
};

/// Args for the `preprocess` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Directory of raw `*.csv` datasets (defaults to RAW_DIR).
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,
    /// Directory receiving the master dataset (defaults to PROCESSED_DIR).
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Synonym JSON resource (defaults to SYNONYMS_PATH).
    #[arg(long)]
    pub synonyms: Option<PathBuf>,
    /// `skip` or `abort` when a single file cannot be read.
    #[arg(long)]
    pub on_file_error: Option<FileErrorPolicy>,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let options = PipelineOptions {
        input_dir: args.raw_dir.unwrap_or(settings.raw_dir),
        output_dir: args.out_dir.unwrap_or(settings.processed_dir),
        synonyms_path: args.synonyms.unwrap_or(settings.synonyms_path),
        on_file_error: args.on_file_error.unwrap_or(settings.on_file_error),
    };
    let report = pipeline::run(&options)
        .with_context(|| format!("preprocessing {}", options.input_dir.display()))?;
    for failed in &report.failed {
        info!(path = %failed.path.display(), error = %failed.error, "file was skipped");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
