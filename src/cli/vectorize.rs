//! CLI entry-point for single-request vectorisation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{debug, instrument};

use crate::{
    config::Settings,
    data::{normalize::SynonymTable, store::FEATURES_FILE},
    features::{build_request_vector, build_vector, FeatureIndex},
};

/// Args for the `vectorize` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Comma separated symptoms.
    #[arg(long, value_delimiter = ',', required = true)]
    pub symptoms: Vec<String>,
    /// Feature index to lay the vector out with.
    #[arg(long)]
    pub index: Option<PathBuf>,
    /// Skip normalisation and synonym resolution; match index names exactly.
    #[arg(long)]
    pub verbatim: bool,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let index_path = args
        .index
        .unwrap_or_else(|| settings.join_processed(FEATURES_FILE));
    let index = FeatureIndex::load(&index_path)
        .with_context(|| format!("loading feature index {}", index_path.display()))?;
    let symptoms = super::symptom_args(&args.symptoms);
    let vector = if args.verbatim {
        build_vector(&symptoms, &index)
    } else {
        let synonyms = SynonymTable::load(&settings.synonyms_path)?;
        build_request_vector(&symptoms, &index, &synonyms)
    };
    debug!(
        active = vector.iter().filter(|v| **v == 1).count(),
        width = vector.len(),
        "built request vector"
    );
    println!("{}", serde_json::to_string(&vector.to_vec())?);
    Ok(())
}
