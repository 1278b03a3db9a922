use std::path::PathBuf;

use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;

use loterix_model::{ArtifactPaths, Network, REFERENCE_TOPOLOGY, save_model};
use loterix_training::{TrainConfig, Trainer};

use crate::util::{load_archive, load_model_pair, save_json};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Draw archive CSV
    #[arg(long)]
    csv: PathBuf,
    /// Stem for the saved artifact pair
    #[arg(long)]
    output: PathBuf,
    /// Stem of a base model pair to start from; a fresh random network
    /// otherwise
    #[arg(long)]
    base: Option<PathBuf>,
    #[arg(long, default_value = "evolved")]
    name: String,
    #[arg(long, default_value_t = 10)]
    population: usize,
    #[arg(long, default_value_t = 50)]
    generations: u32,
    /// Fixed seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Also write the per-generation reports as JSON
    #[arg(long)]
    history: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let archive = load_archive(&arg.csv)?;
    let base = match &arg.base {
        Some(stem) => load_model_pair(stem)?.0,
        None => {
            let mut rng = match arg.seed {
                Some(seed) => Pcg64Mcg::seed_from_u64(seed),
                None => Pcg64Mcg::from_rng(&mut rand::rng()),
            };
            Network::random(&mut rng, &REFERENCE_TOPOLOGY)
        }
    };

    eprintln!(
        "Training over {} draws, population {}, {} generations",
        archive.len(),
        arg.population,
        arg.generations
    );

    let trainer = Trainer::new(TrainConfig {
        population: arg.population,
        generations: arg.generations,
        seed: arg.seed,
    });
    let outcome = trainer.run(&archive, &base, |report| {
        eprintln!(
            "Generation #{}: best player {} scored {} (mean {:.1}, min {:.0}, max {:.0}, stddev {:.1})",
            report.generation,
            report.best_player_id,
            report.best_score,
            report.stats.mean,
            report.stats.min,
            report.stats.max,
            report.stats.std_dev,
        );
    })?;

    let paths = ArtifactPaths::from_stem(&arg.output);
    let metadata = save_model(&outcome.best, &arg.name, outcome.best_score, &paths)?;

    eprintln!();
    eprintln!("Model saved successfully");
    eprintln!("  Metadata: {}", paths.metadata.display());
    eprintln!("  Weights: {}", paths.weights.display());
    eprintln!("  Name: {}", metadata.name);
    eprintln!("  Trained at: {}", metadata.trained_at);
    eprintln!("  Best score: {}", metadata.final_score);

    if let Some(path) = &arg.history {
        save_json(&outcome.history, Some(path))?;
        eprintln!("  History: {}", path.display());
    }

    Ok(())
}
