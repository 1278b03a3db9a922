use rand::Rng;

use crate::draw::{DRAW_SIZE, Draw};

/// A fixed-length ball prediction, always [`DRAW_SIZE`] numbers in `1..=25`.
pub type Prediction = [u8; DRAW_SIZE];

/// Produces predictions for a draw and supports the one model derivation the
/// simulation needs: an independently owned, weight-perturbed copy.
///
/// `predict` must not mutate the model; `perturbed` must deep-copy before
/// scaling so the receiver stays bit-for-bit intact.
pub trait Predictor {
    type Error: std::error::Error + Send + Sync + 'static;

    fn predict(&self, draw: &Draw) -> Result<Prediction, Self::Error>;

    fn perturbed<R>(&self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
        Self: Sized;
}

/// A simulated agent: an id, a cumulative score, its latest prediction, and
/// the model it predicts with.
#[derive(Debug, Clone)]
pub struct Player<P> {
    id: u32,
    score: i64,
    prediction: Option<Prediction>,
    predictor: P,
}

impl<P> Player<P> {
    #[must_use]
    pub fn new(id: u32, predictor: P) -> Self {
        Self {
            id,
            score: 0,
            prediction: None,
            predictor,
        }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn score(&self) -> i64 {
        self.score
    }

    #[must_use]
    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    #[must_use]
    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Commits one round: stores the prediction and adds the reward to the
    /// cumulative score.
    pub fn record_round(&mut self, prediction: Prediction, reward: i64) {
        self.prediction = Some(prediction);
        self.score += reward;
    }

    /// Zeroes the score, keeping the prediction history and model. Used by
    /// prune-to-best evolution.
    pub fn clear_score(&mut self) {
        self.score = 0;
    }

    /// Returns the player to its initial state: score 0, no prediction. The
    /// model is kept.
    pub fn reset(&mut self) {
        self.score = 0;
        self.prediction = None;
    }

    /// Swaps in a new model, e.g. a perturbed clone of the generation's best.
    pub fn replace_predictor(&mut self, predictor: P) {
        self.predictor = predictor;
    }
}
