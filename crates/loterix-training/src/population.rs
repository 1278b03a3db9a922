use rand::Rng;

use loterix_engine::{Player, Predictor};

/// A population where every player carries an identical copy of the base
/// model. The natural pairing for [`PruneToBest`], which never touches
/// models.
///
/// [`PruneToBest`]: crate::evolver::PruneToBest
#[must_use]
pub fn identical_population<P>(base: &P, count: usize) -> Vec<Player<P>>
where
    P: Predictor + Clone,
{
    (1..=count)
        .map(|id| Player::new(player_id(id), base.clone()))
        .collect()
}

/// A population seeded for [`CloneAndMutate`]: player 1 carries the base
/// model verbatim, every other player an independent perturbed clone, so the
/// game diverges from the first round.
///
/// [`CloneAndMutate`]: crate::evolver::CloneAndMutate
#[must_use]
pub fn perturbed_population<P, R>(base: &P, count: usize, rng: &mut R) -> Vec<Player<P>>
where
    P: Predictor + Clone,
    R: Rng + ?Sized,
{
    (1..=count)
        .map(|id| {
            let model = if id == 1 {
                base.clone()
            } else {
                base.perturbed(rng)
            };
            Player::new(player_id(id), model)
        })
        .collect()
}

fn player_id(id: usize) -> u32 {
    u32::try_from(id).expect("population sizes fit in u32")
}
