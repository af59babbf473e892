//! CLI entry-point for exporting the training matrix.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::Settings,
    data::store::{self, ArtifactPaths},
    features::{dataset_to_matrix, export},
};

/// Args for the `export` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Parquet destination (defaults to MODEL_DIR/training_matrix.parquet).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let master = store::load_master(&ArtifactPaths::in_dir(&settings.processed_dir))?;
    let (matrix, labels) = dataset_to_matrix(&master.records, &master.index);
    let out = args
        .out
        .unwrap_or_else(|| settings.join_model("training_matrix.parquet"));
    export::write_matrix_parquet(&matrix, &labels, &master.index, &out)
}
