//! CLI entry-point for ranking conditions from a symptom list.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    cli::train::MODEL_FILE,
    config::Settings,
    data::{normalize::SynonymTable, store::FEATURES_FILE},
    features::{build_request_vector, FeatureIndex},
    model::{self, Classifier, SoftmaxModel},
};

/// Args for the `predict` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Comma separated symptoms.
    #[arg(long, value_delimiter = ',', required = true)]
    pub symptoms: Vec<String>,
    /// Number of conditions to return (defaults to TOP_K).
    #[arg(long)]
    pub top_k: Option<usize>,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let index = FeatureIndex::load(&settings.join_processed(FEATURES_FILE))?;
    let model = SoftmaxModel::load(&settings.join_model(MODEL_FILE))?;
    model::ensure_paired(&model, &index)?;

    let synonyms = SynonymTable::load(&settings.synonyms_path)?;
    let symptoms = super::symptom_args(&args.symptoms);
    let vector = build_request_vector(&symptoms, &index, &synonyms);
    let ranked = model.rank(vector.view(), args.top_k.unwrap_or(settings.top_k))?;
    println!("{}", serde_json::to_string_pretty(&ranked)?);
    Ok(())
}
