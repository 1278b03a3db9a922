//! Ball-to-unit-interval encoding.
//!
//! Every value fed to a network passes through [`normalize`]; this is the
//! only input encoding in the crate, so the inference path always matches
//! whatever the model was trained against.

use loterix_engine::{BALL_MAX, BALL_MIN};

/// Maps a ball into `(0, 1]`.
#[must_use]
pub fn normalize(ball: u8) -> f32 {
    f32::from(ball) / f32::from(BALL_MAX)
}

/// Inverse of [`normalize`], lossy only through rounding:
/// `denormalize(normalize(b)) == b` for every ball in the domain.
#[must_use]
pub fn denormalize(value: f32) -> u8 {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let ball = (value * f32::from(BALL_MAX)).round() as u8;
    ball
}

/// Maps a sigmoid output in `[0, 1]` onto a ball: `round(x * 24) + 1`,
/// clamped into the domain. A closed, reproducible discretization, not a
/// probabilistic sample.
#[must_use]
pub fn discretize(value: f32) -> u8 {
    #[expect(clippy::cast_possible_truncation)]
    let ball = (value * f32::from(BALL_MAX - 1)).round() as i32 + 1;
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = ball.clamp(i32::from(BALL_MIN), i32::from(BALL_MAX)) as u8;
    clamped
}
