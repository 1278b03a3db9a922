use std::path::PathBuf;

use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;

use loterix_engine::{CursorPolicy, Evolver, GameSession, SessionConfig};
use loterix_model::Network;
use loterix_training::{
    CloneAndMutate, PruneToBest, identical_population, perturbed_population,
};

use crate::{
    tui::Tui,
    util::{load_archive, load_model_pair},
};

mod app;

/// Which evolution policy drives generation boundaries.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum Strategy {
    /// Keep the best score, reset everyone else.
    #[default]
    Prune,
    /// Hand everyone else a perturbed clone of the best model.
    Mutate,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Draw archive CSV
    #[arg(long)]
    csv: PathBuf,
    /// Model artifact stem (`<stem>.model.json` + `<stem>.weights.bin`)
    #[arg(long)]
    model: PathBuf,
    #[arg(long, default_value_t = 10)]
    players: usize,
    #[arg(long, default_value = "prune")]
    strategy: Strategy,
    /// Game-loop ticks per second
    #[arg(long, default_value_t = 2.0)]
    tick_rate: f64,
    /// Wrap back to the first draw instead of going idle at the end
    #[arg(long)]
    infinite: bool,
    /// Pick draws at random instead of walking the archive in order
    #[arg(long)]
    random_draws: bool,
    /// Fixed seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let archive = load_archive(&arg.csv)?;
    let (network, metadata) = load_model_pair(&arg.model)?;

    let mut rng = match arg.seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(seed),
        None => Pcg64Mcg::from_rng(&mut rand::rng()),
    };
    let (players, evolver): (_, Box<dyn Evolver<Network>>) = match arg.strategy {
        Strategy::Prune => (
            identical_population(&network, arg.players),
            Box::new(PruneToBest),
        ),
        Strategy::Mutate => (
            perturbed_population(&network, arg.players, &mut rng),
            Box::new(CloneAndMutate),
        ),
    };

    let session = GameSession::new(
        archive,
        players,
        evolver,
        SessionConfig {
            cursor: if arg.random_draws {
                CursorPolicy::Random
            } else {
                CursorPolicy::Sequential
            },
            infinite: arg.infinite,
            seed: arg.seed,
        },
    );

    let mut app = app::PlayApp::new(session, metadata.name, arg.tick_rate);
    Tui::new().run(&mut app)
}
