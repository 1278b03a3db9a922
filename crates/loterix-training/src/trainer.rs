use rand::{RngCore, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use loterix_engine::{
    DrawArchive, Evolver as _, Player, Predictor, match_count, reward,
};

use crate::{evolver::CloneAndMutate, population::perturbed_population, stats::Statistics};

/// Offline training knobs.
#[derive(Debug, Clone, Copy)]
pub struct TrainConfig {
    pub population: usize,
    pub generations: u32,
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            population: 10,
            generations: 50,
            seed: None,
        }
    }
}

/// Per-generation summary reported to the progress callback and kept in the
/// training history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationReport {
    pub generation: u32,
    pub best_player_id: u32,
    pub best_score: i64,
    pub stats: Statistics,
}

/// Result of a training run: the winning model plus the full history.
#[derive(Debug, Clone)]
pub struct TrainOutcome<P> {
    pub best: P,
    pub best_score: i64,
    pub history: Vec<GenerationReport>,
}

/// A player failed to produce a prediction; training cannot continue with a
/// partial generation.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("player {player_id} failed to predict draw #{draw_id}: {source}")]
pub struct TrainError<E>
where
    E: std::error::Error + 'static,
{
    pub player_id: u32,
    pub draw_id: u32,
    pub source: E,
}

/// Headless evolutionary trainer.
///
/// Each generation plays the full archive in order, scores every player with
/// the payout curve, reports statistics, then evolves with clone-and-mutate
/// (prune-to-best never changes any model, so there would be nothing to
/// train). After the final generation the population is left un-evolved so
/// the winner's model can be extracted as trained.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trainer {
    pub config: TrainConfig,
}

impl Trainer {
    #[must_use]
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn run<P, F>(
        &self,
        archive: &DrawArchive,
        base: &P,
        mut on_generation: F,
    ) -> Result<TrainOutcome<P>, TrainError<P::Error>>
    where
        P: Predictor + Clone,
        F: FnMut(&GenerationReport),
    {
        let mut rng: Pcg64Mcg = match self.config.seed {
            Some(seed) => Pcg64Mcg::seed_from_u64(seed),
            None => Pcg64Mcg::from_rng(&mut rand::rng()),
        };
        let mut players = perturbed_population(base, self.config.population, &mut rng);
        let mut evolver = CloneAndMutate;
        let mut history = Vec::new();
        let mut best: Option<(P, i64)> = None;

        for generation in 1..=self.config.generations {
            play_archive(archive, &mut players)?;

            let report = summarize(generation, &players);
            on_generation(&report);

            let winner = players
                .iter()
                .find(|player| player.id() == report.best_player_id)
                .expect("best player id comes from this population");
            if best.as_ref().is_none_or(|(_, score)| report.best_score > *score) {
                best = Some((winner.predictor().clone(), report.best_score));
            }
            history.push(report);

            if generation < self.config.generations {
                evolver.evolve(&mut players, &mut rng as &mut dyn RngCore);
            }
        }

        let (best, best_score) = best.expect("at least one generation runs");
        Ok(TrainOutcome {
            best,
            best_score,
            history,
        })
    }
}

fn play_archive<P>(
    archive: &DrawArchive,
    players: &mut [Player<P>],
) -> Result<(), TrainError<P::Error>>
where
    P: Predictor,
{
    let total_players = players.len();
    for draw in archive.draws() {
        for player in players.iter_mut() {
            let prediction =
                player
                    .predictor()
                    .predict(draw)
                    .map_err(|source| TrainError {
                        player_id: player.id(),
                        draw_id: draw.id,
                        source,
                    })?;
            let matches = match_count(&prediction, draw);
            player.record_round(prediction, reward(matches, total_players));
        }
    }
    Ok(())
}

fn summarize<P>(generation: u32, players: &[Player<P>]) -> GenerationReport {
    let (best_player_id, best_score) = players
        .iter()
        .fold(None, |best: Option<(u32, i64)>, player| match best {
            Some((_, score)) if score >= player.score() => best,
            _ => Some((player.id(), player.score())),
        })
        .expect("population is never empty");

    #[expect(clippy::cast_precision_loss)]
    let stats = Statistics::compute(players.iter().map(|p| p.score() as f64))
        .expect("population is never empty");

    GenerationReport {
        generation,
        best_player_id,
        best_score,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use loterix_engine::{DRAW_SIZE, Draw};
    use loterix_model::Network;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn archive_of(count: usize) -> DrawArchive {
        let draws = (0..count)
            .map(|i| Draw {
                id: u32::try_from(i).unwrap() + 1,
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                balls: [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
            })
            .collect();
        DrawArchive::from_draws(draws)
    }

    fn trainer(generations: u32, seed: u64) -> Trainer {
        Trainer::new(TrainConfig {
            population: 4,
            generations,
            seed: Some(seed),
        })
    }

    #[test]
    fn runs_the_configured_number_of_generations() {
        let archive = archive_of(3);
        let mut rng = Pcg64Mcg::seed_from_u64(11);
        let base = Network::random(&mut rng, &[DRAW_SIZE, 6, DRAW_SIZE]);

        let mut seen = Vec::new();
        let outcome = trainer(5, 1)
            .run(&archive, &base, |report| seen.push(report.generation))
            .unwrap();

        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(outcome.history.len(), 5);
    }

    #[test]
    fn history_generations_ascend_and_scores_are_consistent() {
        let archive = archive_of(2);
        let mut rng = Pcg64Mcg::seed_from_u64(12);
        let base = Network::random(&mut rng, &[DRAW_SIZE, 6, DRAW_SIZE]);

        let outcome = trainer(4, 2).run(&archive, &base, |_| {}).unwrap();

        for (index, report) in outcome.history.iter().enumerate() {
            assert_eq!(report.generation, u32::try_from(index).unwrap() + 1);
            assert!(report.stats.max >= report.stats.min);
            #[expect(clippy::cast_precision_loss)]
            let best = report.best_score as f64;
            assert!((report.stats.max - best).abs() < f64::EPSILON);
        }
        assert!(
            outcome
                .history
                .iter()
                .any(|report| report.best_score == outcome.best_score)
        );
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let archive = archive_of(2);
        let mut rng = Pcg64Mcg::seed_from_u64(13);
        let base = Network::random(&mut rng, &[DRAW_SIZE, 6, DRAW_SIZE]);

        let first = trainer(3, 7).run(&archive, &base, |_| {}).unwrap();
        let second = trainer(3, 7).run(&archive, &base, |_| {}).unwrap();

        assert_eq!(first.history, second.history);
        assert_eq!(first.best, second.best);
    }
}
