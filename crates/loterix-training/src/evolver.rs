use rand::RngCore;

use loterix_engine::{EvolutionOutcome, Evolver, Player, Predictor};

/// Keep-best-reset-rest: the best score survives, everyone else restarts at
/// zero. Models and predictions are untouched.
///
/// Ties all retain their score; the reported best is the first-encountered
/// by ascending player id.
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneToBest;

impl<P: Predictor> Evolver<P> for PruneToBest {
    fn evolve(&mut self, players: &mut [Player<P>], _rng: &mut dyn RngCore) -> EvolutionOutcome {
        let (best_player_id, best_score) = best_of(players);
        for player in players.iter_mut() {
            if player.score() < best_score {
                player.clear_score();
            }
        }
        EvolutionOutcome {
            best_player_id,
            best_score,
        }
    }
}

/// Decaying mutation of the winner: every other player is handed an
/// independent, weight-perturbed clone of the best player's model, then the
/// whole population restarts with empty scores and predictions.
///
/// The best player's own model is preserved unperturbed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloneAndMutate;

impl<P: Predictor + Clone> Evolver<P> for CloneAndMutate {
    fn evolve(&mut self, players: &mut [Player<P>], rng: &mut dyn RngCore) -> EvolutionOutcome {
        let (best_index, best_player_id, best_score) = best_index_of(players);
        let template = players[best_index].predictor().clone();

        for (index, player) in players.iter_mut().enumerate() {
            if index != best_index {
                player.replace_predictor(template.perturbed(rng));
            }
            player.reset();
        }

        EvolutionOutcome {
            best_player_id,
            best_score,
        }
    }
}

fn best_of<P>(players: &[Player<P>]) -> (u32, i64) {
    let (_, id, score) = best_index_of(players);
    (id, score)
}

/// First-encountered maximum by score; player ids ascend with slice order,
/// so ties resolve to the lowest id.
fn best_index_of<P>(players: &[Player<P>]) -> (usize, u32, i64) {
    assert!(!players.is_empty(), "cannot evolve an empty population");
    let mut best = 0;
    for (index, player) in players.iter().enumerate().skip(1) {
        if player.score() > players[best].score() {
            best = index;
        }
    }
    (best, players[best].id(), players[best].score())
}
