use crate::{ball_set::BallSet, draw::Draw};

/// Counts how many predicted balls appear in the draw.
///
/// Both sides are treated as sets: a duplicated predicted number is counted
/// at most once, and order is irrelevant.
#[must_use]
pub fn match_count(predicted: &[u8], draw: &Draw) -> u32 {
    let predicted: BallSet = predicted.iter().collect();
    let drawn: BallSet = draw.balls.iter().collect();
    predicted.intersection(drawn).len()
}

/// The payout curve: `round(10^(matches - 10) * (1 + total_players / 100))`.
///
/// Deterministic and pure. Strictly monotonic in `matches` from 10 upward and
/// non-decreasing everywhere; below 9 matches the rounded payout is 0. The
/// competition factor scales the payout with the population size.
#[must_use]
pub fn reward(matches: u32, total_players: usize) -> i64 {
    #[expect(clippy::cast_precision_loss)]
    let competition = 1.0 + total_players as f64 / 100.0;
    let base = 10f64.powi(matches.cast_signed() - 10);
    #[expect(clippy::cast_possible_truncation)]
    let rounded = (base * competition).round() as i64;
    rounded
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::draw::DRAW_SIZE;

    fn draw_of(balls: [u8; DRAW_SIZE]) -> Draw {
        Draw {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            balls,
        }
    }

    #[test]
    fn full_match_counts_every_ball() {
        let draw = draw_of([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        let predicted: Vec<u8> = (1..=15).collect();
        assert_eq!(match_count(&predicted, &draw), 15);
    }

    #[test]
    fn duplicate_predictions_never_double_count() {
        let draw = draw_of([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        let predicted = [1u8; 15];
        assert_eq!(match_count(&predicted, &draw), 1);
    }

    #[test]
    fn disjoint_prediction_scores_zero_matches() {
        let draw = draw_of([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        let predicted: Vec<u8> = (16..=25).collect();
        assert_eq!(match_count(&predicted, &draw), 0);
    }

    #[test]
    fn reward_is_non_decreasing_in_matches() {
        for total_players in [1, 10, 100] {
            let mut previous = reward(0, total_players);
            for matches in 1..=15 {
                let current = reward(matches, total_players);
                assert!(
                    current >= previous,
                    "reward({matches}, {total_players}) = {current} < {previous}"
                );
                previous = current;
            }
        }
    }

    #[test]
    fn reward_known_values() {
        assert_eq!(reward(15, 10), 110_000);
        assert_eq!(reward(10, 0), 1);
        assert_eq!(reward(11, 100), 20);
        assert_eq!(reward(0, 10), 0);
    }

    #[test]
    fn reward_scales_with_population() {
        assert!(reward(13, 100) > reward(13, 1));
    }
}
