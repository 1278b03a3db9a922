use std::path::PathBuf;

use anyhow::Context as _;

use loterix_engine::{Predictor as _, format_balls};

use crate::util::{load_archive, load_model_pair};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    /// Draw archive CSV
    #[arg(long)]
    csv: PathBuf,
    /// Model artifact stem
    #[arg(long)]
    model: PathBuf,
}

pub(crate) fn run(arg: &PredictArg) -> anyhow::Result<()> {
    let archive = load_archive(&arg.csv)?;
    let (network, metadata) = load_model_pair(&arg.model)?;

    let latest = archive.latest().context("draw archive is empty")?;
    let prediction = network
        .predict(latest)
        .with_context(|| format!("model {} failed to predict", metadata.name))?;

    println!(
        "latest draw #{} ({}): {}",
        latest.id,
        latest.date,
        format_balls(&latest.balls)
    );
    println!("predicted next: {}", format_balls(&prediction));
    Ok(())
}
