//! CLI entry-point for fitting and evaluating the reference classifier.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::store::{self, ArtifactPaths},
    features::dataset_to_matrix,
    model::{self, SoftmaxModel, TrainOptions},
};

pub const MODEL_FILE: &str = "model.json";
pub const EVAL_FILE: &str = "model.eval.json";

/// Args for the `train` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Solver iteration cap.
    #[arg(long, default_value_t = 100)]
    pub max_iterations: u64,
    /// L2 regularisation strength.
    #[arg(long, default_value_t = 1.0)]
    pub alpha: f64,
    /// k for top-k accuracy (defaults to TOP_K).
    #[arg(long)]
    pub top_k: Option<usize>,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let master = store::load_master(&ArtifactPaths::in_dir(&settings.processed_dir))?;
    let (matrix, labels) = dataset_to_matrix(&master.records, &master.index);
    let options = TrainOptions {
        max_iterations: args.max_iterations,
        alpha: args.alpha,
    };
    let model = SoftmaxModel::train(&matrix, &labels, &master.index, &options)?;
    let top_k = args.top_k.unwrap_or(settings.top_k);
    let evaluation = model::evaluate(&model, &matrix, &labels, top_k)?;
    info!(
        accuracy = evaluation.accuracy,
        top_k,
        top_k_accuracy = evaluation.top_k_accuracy,
        "evaluated on master dataset"
    );

    model.save(&settings.join_model(MODEL_FILE))?;
    let eval_text = serde_json::to_string_pretty(&evaluation)?;
    store::write_atomic(&settings.join_model(EVAL_FILE), eval_text.as_bytes())?;
    println!("{eval_text}");
    Ok(())
}
