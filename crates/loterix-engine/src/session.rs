use std::fmt;

use rand::{Rng as _, RngCore, SeedableRng as _};
use rand_pcg::Pcg64Mcg;

use crate::{
    draw::{Draw, DrawArchive, format_balls},
    log::{EventLog, EvolutionLog, EvolutionSample},
    player::{Player, Prediction, Predictor},
    reward::{match_count, reward},
};

/// Lifecycle of a game session.
///
/// `start` moves `Idle`/`Paused` to `Running`, `pause` moves `Running` to
/// `Paused`, `reset` returns to `Idle` from anywhere. Exhausting the draw
/// sequence outside infinite mode also returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Idle,
    Running,
    Paused,
}

/// How the next draw is selected each tick.
///
/// Sequential walks the archive in order and is the default: it makes runs
/// reproducible. Random samples uniformly from the archive; a "cycle" is then
/// simply `archive.len()` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorPolicy {
    #[default]
    Sequential,
    Random,
}

/// Session knobs fixed at construction time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub cursor: CursorPolicy,
    /// Wrap to the first draw after a full cycle instead of going idle.
    pub infinite: bool,
    /// Seed for draw selection and weight perturbation. `None` seeds from
    /// entropy; a fixed value makes the whole run deterministic.
    pub seed: Option<u64>,
}

/// Why a `start` request was refused. The session stays in its prior state
/// and appends exactly one error line to the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PreconditionError {
    #[display("no draws loaded")]
    NoDraws,
    #[display("no players in the population")]
    NoPlayers,
    #[display("session is already running")]
    AlreadyRunning,
}

/// Advances the population from one generation to the next.
///
/// Implementations must treat ties deterministically (first-encountered by
/// ascending player id) and must not touch the reported best player's model.
pub trait Evolver<P: Predictor>: fmt::Debug {
    fn evolve(&mut self, players: &mut [Player<P>], rng: &mut dyn RngCore) -> EvolutionOutcome;
}

/// What an evolver reports back: who won the generation and with what score
/// (captured before any score reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionOutcome {
    pub best_player_id: u32,
    pub best_score: i64,
}

/// The timer-driven game loop as an explicit state machine.
///
/// The session owns the authoritative cursor, progress counter, generation
/// counter, and player population; every tick re-reads them from `self`
/// rather than from captured snapshots. A tick runs to completion on the
/// calling thread, so tick bodies never overlap and pause/reset between
/// ticks can never observe a half-applied round.
#[derive(Debug)]
pub struct GameSession<P: Predictor> {
    archive: DrawArchive,
    players: Vec<Player<P>>,
    evolver: Box<dyn Evolver<P>>,
    state: SessionState,
    cursor_policy: CursorPolicy,
    infinite: bool,
    /// Index of the draw the next sequential tick will play.
    cursor: usize,
    /// Ticks completed in the current generation.
    progress: usize,
    generation: u32,
    last_played: Option<usize>,
    rng: Pcg64Mcg,
    event_log: EventLog,
    evolution_log: EvolutionLog,
}

impl<P: Predictor> GameSession<P> {
    #[must_use]
    pub fn new(
        archive: DrawArchive,
        players: Vec<Player<P>>,
        evolver: Box<dyn Evolver<P>>,
        config: SessionConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => Pcg64Mcg::seed_from_u64(seed),
            None => Pcg64Mcg::from_rng(&mut rand::rng()),
        };
        Self {
            archive,
            players,
            evolver,
            state: SessionState::Idle,
            cursor_policy: config.cursor,
            infinite: config.infinite,
            cursor: 0,
            progress: 0,
            generation: 1,
            last_played: None,
            rng,
            event_log: EventLog::default(),
            evolution_log: EvolutionLog::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn players(&self) -> &[Player<P>] {
        &self.players
    }

    #[must_use]
    pub fn archive(&self) -> &DrawArchive {
        &self.archive
    }

    /// Ticks completed in the current generation, for progress display.
    #[must_use]
    pub fn progress(&self) -> usize {
        self.progress
    }

    /// The draw played by the most recent tick, if any.
    #[must_use]
    pub fn current_draw(&self) -> Option<&Draw> {
        self.last_played.and_then(|index| self.archive.get(index))
    }

    /// The highest-scoring player, ties broken by ascending id.
    #[must_use]
    pub fn best_player(&self) -> Option<&Player<P>> {
        self.players
            .iter()
            .fold(None, |best: Option<&Player<P>>, player| match best {
                Some(b) if b.score() >= player.score() => Some(b),
                _ => Some(player),
            })
    }

    #[must_use]
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    #[must_use]
    pub fn evolution_log(&self) -> &EvolutionLog {
        &self.evolution_log
    }

    /// Requests `Idle`/`Paused` → `Running`.
    ///
    /// Refused when there is nothing to play or the session is already
    /// running; the refusal appends exactly one error log line and leaves the
    /// state unchanged.
    pub fn start(&mut self) -> Result<(), PreconditionError> {
        let refusal = if self.archive.is_empty() {
            Some(PreconditionError::NoDraws)
        } else if self.players.is_empty() {
            Some(PreconditionError::NoPlayers)
        } else if self.state.is_running() {
            Some(PreconditionError::AlreadyRunning)
        } else {
            None
        };
        if let Some(err) = refusal {
            self.event_log.error(format!("cannot start: {err}"));
            return Err(err);
        }

        self.state = SessionState::Running;
        self.event_log
            .info(format!("session running (generation {})", self.generation));
        Ok(())
    }

    /// `Running` → `Paused`. No-op in any other state.
    pub fn pause(&mut self) {
        if self.state.is_running() {
            self.state = SessionState::Paused;
            self.event_log.info("session paused");
        }
    }

    /// Returns every piece of simulation state to its initial value and goes
    /// `Idle`. Draws and player models are inputs, not simulation state, and
    /// are kept.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.cursor = 0;
        self.progress = 0;
        self.generation = 1;
        self.last_played = None;
        for player in &mut self.players {
            player.reset();
        }
        self.event_log.clear();
        self.evolution_log.clear();
    }

    /// Runs one round of the game loop.
    ///
    /// A no-op unless `Running`, which makes a timer callback that fires
    /// after a pause or reset harmless. The round is two-phase: every
    /// player's prediction is staged first and nothing is committed until all
    /// of them succeeded, so a mid-round failure leaves scores exactly as
    /// they were. On failure the session transitions to `Paused` with an
    /// error log line instead of continuing with corrupted state.
    pub fn tick(&mut self) {
        if !self.state.is_running() {
            return;
        }

        let draw_index = match self.cursor_policy {
            CursorPolicy::Sequential => self.cursor,
            CursorPolicy::Random => self.rng.random_range(0..self.archive.len()),
        };
        let draw = self.archive.draws()[draw_index].clone();

        // Phase 1: stage every outcome without touching session state.
        let total_players = self.players.len();
        let mut staged: Vec<(Prediction, u32, i64)> = Vec::with_capacity(total_players);
        for player in &self.players {
            match player.predictor().predict(&draw) {
                Ok(prediction) => {
                    let matches = match_count(&prediction, &draw);
                    staged.push((prediction, matches, reward(matches, total_players)));
                }
                Err(err) => {
                    self.state = SessionState::Paused;
                    self.event_log.error(format!(
                        "player {} failed to predict draw #{}: {err}; session paused",
                        player.id(),
                        draw.id
                    ));
                    return;
                }
            }
        }

        // Phase 2: commit the round.
        self.last_played = Some(draw_index);
        self.event_log.info(format!(
            "draw #{} rolled: {}",
            draw.id,
            format_balls(&draw.balls)
        ));
        for (player, (prediction, matches, payout)) in self.players.iter_mut().zip(staged) {
            player.record_round(prediction, payout);
            self.event_log.info(format!(
                "player {}: {matches} matches, reward {payout}",
                player.id()
            ));
            self.evolution_log.push(EvolutionSample {
                generation: self.generation,
                player_id: player.id(),
                score: player.score(),
            });
        }

        self.progress += 1;
        if self.cursor_policy == CursorPolicy::Sequential {
            self.cursor += 1;
        }
        if self.progress >= self.archive.len() {
            self.finish_generation();
        }
    }

    fn finish_generation(&mut self) {
        let outcome = self.evolver.evolve(&mut self.players, &mut self.rng);
        self.evolution_log.push(EvolutionSample {
            generation: self.generation,
            player_id: outcome.best_player_id,
            score: outcome.best_score,
        });
        self.event_log.info(format!(
            "generation {} complete: best player {} with score {}",
            self.generation, outcome.best_player_id, outcome.best_score
        ));
        self.generation += 1;
        self.cursor = 0;
        self.progress = 0;

        if !self.infinite {
            self.state = SessionState::Idle;
            self.event_log.info("draw sequence exhausted, session idle");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::log::LogKind;

    /// Always predicts the same ball set.
    #[derive(Debug, Clone)]
    struct FixedPredictor(Prediction);

    #[derive(Debug, derive_more::Display, derive_more::Error)]
    #[display("stub predictor failure")]
    struct StubError;

    impl Predictor for FixedPredictor {
        type Error = StubError;

        fn predict(&self, _draw: &Draw) -> Result<Prediction, StubError> {
            Ok(self.0)
        }

        fn perturbed<R>(&self, _rng: &mut R) -> Self
        where
            R: rand::Rng + ?Sized,
        {
            self.clone()
        }
    }

    /// Fails on every prediction.
    #[derive(Debug, Clone)]
    struct FailingPredictor;

    impl Predictor for FailingPredictor {
        type Error = StubError;

        fn predict(&self, _draw: &Draw) -> Result<Prediction, StubError> {
            Err(StubError)
        }

        fn perturbed<R>(&self, _rng: &mut R) -> Self
        where
            R: rand::Rng + ?Sized,
        {
            Self
        }
    }

    /// Reports the first player as best and changes nothing.
    #[derive(Debug, Default)]
    struct BestFirstEvolver;

    impl<P: Predictor> Evolver<P> for BestFirstEvolver {
        fn evolve(
            &mut self,
            players: &mut [Player<P>],
            _rng: &mut dyn RngCore,
        ) -> EvolutionOutcome {
            let best = &players[0];
            EvolutionOutcome {
                best_player_id: best.id(),
                best_score: best.score(),
            }
        }
    }

    const WINNING: Prediction = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

    fn archive_of(count: usize) -> DrawArchive {
        let draws = (0..count)
            .map(|i| Draw {
                id: u32::try_from(i).unwrap() + 1,
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                balls: WINNING,
            })
            .collect();
        DrawArchive::from_draws(draws)
    }

    fn fixed_players(count: u32) -> Vec<Player<FixedPredictor>> {
        (1..=count)
            .map(|id| Player::new(id, FixedPredictor(WINNING)))
            .collect()
    }

    fn session(
        draws: usize,
        players: u32,
        infinite: bool,
    ) -> GameSession<FixedPredictor> {
        GameSession::new(
            archive_of(draws),
            fixed_players(players),
            Box::new(BestFirstEvolver),
            SessionConfig {
                infinite,
                seed: Some(7),
                ..SessionConfig::default()
            },
        )
    }

    #[test]
    fn start_on_empty_archive_is_refused_with_one_log_line() {
        let mut session = GameSession::new(
            DrawArchive::from_draws(vec![]),
            fixed_players(3),
            Box::new(BestFirstEvolver),
            SessionConfig::default(),
        );

        assert_eq!(session.start(), Err(PreconditionError::NoDraws));
        assert!(session.state().is_idle());
        assert_eq!(session.event_log().len(), 1);
        assert_eq!(session.event_log().entries()[0].kind, LogKind::Error);
    }

    #[test]
    fn start_without_players_is_refused() {
        let mut session: GameSession<FixedPredictor> = GameSession::new(
            archive_of(3),
            vec![],
            Box::new(BestFirstEvolver),
            SessionConfig::default(),
        );

        assert_eq!(session.start(), Err(PreconditionError::NoPlayers));
        assert!(session.state().is_idle());
    }

    #[test]
    fn start_while_running_is_refused() {
        let mut session = session(3, 2, true);
        session.start().unwrap();
        assert_eq!(session.start(), Err(PreconditionError::AlreadyRunning));
        assert!(session.state().is_running());
    }

    #[test]
    fn perfect_prediction_earns_the_maximum_payout() {
        let mut session = session(3, 10, true);
        session.start().unwrap();
        session.tick();

        for player in session.players() {
            assert_eq!(player.score(), 110_000);
            assert_eq!(player.prediction(), Some(&WINNING));
        }
        assert_eq!(session.current_draw().unwrap().id, 1);
    }

    #[test]
    fn tick_outside_running_is_a_no_op() {
        let mut session = session(3, 2, true);
        session.tick();
        assert!(session.players().iter().all(|p| p.score() == 0));
        assert!(session.event_log().is_empty());

        session.start().unwrap();
        session.pause();
        let scores: Vec<i64> = session.players().iter().map(Player::score).collect();
        session.tick();
        let after: Vec<i64> = session.players().iter().map(Player::score).collect();
        assert_eq!(scores, after);
    }

    #[test]
    fn failed_prediction_pauses_without_partial_scores() {
        let players = vec![
            Player::new(1, FailingPredictor),
            Player::new(2, FailingPredictor),
        ];
        let mut session = GameSession::new(
            archive_of(2),
            players,
            Box::new(BestFirstEvolver),
            SessionConfig::default(),
        );
        session.start().unwrap();
        let log_len = session.event_log().len();

        session.tick();

        assert!(session.state().is_paused());
        assert!(session.players().iter().all(|p| p.score() == 0));
        assert!(session.players().iter().all(|p| p.prediction().is_none()));
        assert!(session.evolution_log().is_empty());
        assert_eq!(session.event_log().len(), log_len + 1);
        assert_eq!(session.event_log().entries()[log_len].kind, LogKind::Error);
    }

    #[test]
    fn full_cycle_evolves_and_goes_idle() {
        let mut session = session(3, 2, false);
        session.start().unwrap();
        for _ in 0..3 {
            session.tick();
        }

        assert!(session.state().is_idle());
        assert_eq!(session.generation(), 2);
        assert_eq!(session.progress(), 0);
        let last = session.event_log().entries().last().unwrap();
        assert!(last.message.contains("exhausted"));
    }

    #[test]
    fn infinite_mode_wraps_and_keeps_running() {
        let mut session = session(2, 2, true);
        session.start().unwrap();
        for _ in 0..5 {
            session.tick();
        }

        assert!(session.state().is_running());
        assert_eq!(session.generation(), 3);
        assert_eq!(session.progress(), 1);
    }

    #[test]
    fn evolution_log_generations_are_monotonic() {
        let mut session = session(2, 3, true);
        session.start().unwrap();
        for _ in 0..6 {
            session.tick();
        }

        let samples = session.evolution_log().samples();
        assert!(!samples.is_empty());
        assert!(
            samples
                .windows(2)
                .all(|pair| pair[0].generation <= pair[1].generation)
        );
    }

    #[test]
    fn reset_restores_the_initial_state() {
        let mut session = session(3, 2, true);
        session.start().unwrap();
        session.tick();
        session.tick();
        session.reset();

        assert!(session.state().is_idle());
        assert_eq!(session.generation(), 1);
        assert_eq!(session.progress(), 0);
        assert!(session.current_draw().is_none());
        assert!(session.players().iter().all(|p| p.score() == 0));
        assert!(session.event_log().is_empty());
        assert!(session.evolution_log().is_empty());

        // the session is restartable afterwards
        session.start().unwrap();
        assert!(session.state().is_running());
    }

    #[test]
    fn seeded_random_cursor_is_reproducible() {
        let build = || {
            let mut s = GameSession::new(
                archive_of(5),
                fixed_players(2),
                Box::new(BestFirstEvolver),
                SessionConfig {
                    cursor: CursorPolicy::Random,
                    infinite: true,
                    seed: Some(42),
                },
            );
            s.start().unwrap();
            for _ in 0..10 {
                s.tick();
            }
            s.evolution_log().samples().to_vec()
        };

        assert_eq!(build(), build());
    }

    #[test]
    fn best_player_breaks_ties_by_lowest_id() {
        let mut session = session(3, 4, true);
        session.start().unwrap();
        session.tick();
        // every player scored identically; the first id wins the tie
        assert_eq!(session.best_player().unwrap().id(), 1);
    }
}
