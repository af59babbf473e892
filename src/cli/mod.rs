//! Command-line interface wiring for symptom-pipeline.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod export;
pub mod predict;
pub mod preprocess;
pub mod train;
pub mod vectorize;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Disease/symptom dataset preprocessing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Preprocess(args) => preprocess::run(args, settings),
            Commands::Vectorize(args) => vectorize::run(args, settings),
            Commands::Export(args) => export::run(args, settings),
            Commands::Train(args) => train::run(args, settings),
            Commands::Predict(args) => predict::run(args, settings),
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load raw datasets, merge them and publish the master dataset.
    Preprocess(preprocess::Args),
    /// Turn a symptom list into a feature vector.
    Vectorize(vectorize::Args),
    /// Write the training matrix as parquet.
    Export(export::Args),
    /// Fit and evaluate the reference classifier.
    Train(train::Args),
    /// Rank conditions for a symptom list.
    Predict(predict::Args),
}

/// Split a comma separated flag value that may also contain semicolons.
pub(crate) fn symptom_args(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(';'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
