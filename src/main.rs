//! Entry point wiring CLI dispatch to pipeline modules.

use anyhow::Result;
use symptom_pipeline::{cli::Cli, config::Settings, logging};
use tracing::info;

fn main() -> Result<()> {
    logging::init_tracing()?;
    let cli = Cli::parse();
    let settings = Settings::load()?;

    info!(?cli, "starting command");
    cli.dispatch(settings)
}
