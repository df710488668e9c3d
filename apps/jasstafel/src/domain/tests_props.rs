//! Property tests for scoring, tallies, history and declarations (pure domain).

use proptest::prelude::*;

use crate::domain::game::Declaration;
use crate::domain::history::{Direction, HistoryLog};
use crate::domain::scoring::{self, MATSCH_POINTS, ROUND_POINTS};
use crate::domain::tally::{breakdown, encode};
use crate::domain::test_gens;
use crate::domain::test_prelude;
use crate::domain::test_state_helpers::{flat_settings, new_game, T0};

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: non-sentinel rounds always distribute 157 x multiplier.
    #[test]
    fn prop_round_points_are_conserved(
        raw in 0..=ROUND_POINTS as i32,
        m in test_gens::multiplier(),
    ) {
        let score = scoring::apply(raw, m).unwrap();
        prop_assert_eq!(score.total(), ROUND_POINTS * u32::from(m));
    }

    /// Property: Matsch gives everything to the acting team.
    #[test]
    fn prop_matsch_takes_all(m in test_gens::multiplier()) {
        let score = scoring::apply(MATSCH_POINTS as i32, m).unwrap();
        prop_assert_eq!(score.opponent_score, 0);
        prop_assert_eq!(score.acting_score, MATSCH_POINTS * u32::from(m));
    }

    /// Property: encoding is pure and its groups add up to the count.
    #[test]
    fn prop_tally_is_pure(count in 0u32..500, d in test_gens::denomination()) {
        let a = encode(count, d);
        let b = encode(count, d);
        prop_assert_eq!(a.strokes(), count);
        prop_assert_eq!(a.is_empty(), count == 0);
        prop_assert_eq!(a, b);
    }

    /// Property: the board breakdown never loses points.
    #[test]
    fn prop_breakdown_preserves_points(points in 0u32..20_000) {
        let b = breakdown(points);
        prop_assert_eq!(b.points(), points);
        prop_assert!(b.remainder < 20);
    }

    /// Property: the cursor never leaves the log.
    #[test]
    fn prop_navigation_stays_in_range(
        commits in 0usize..12,
        moves in prop::collection::vec(test_gens::direction(), 0..30),
    ) {
        let mut log = HistoryLog::new(0usize);
        for i in 0..commits {
            log.commit(i + 1);
        }
        for direction in moves {
            let before = log.cursor();
            log.navigate(direction);
            prop_assert!(log.cursor() < log.len());
            let at_boundary = match direction {
                Direction::Backward => before == 0,
                Direction::Forward | Direction::Latest => before + 1 == log.len(),
            };
            if at_boundary {
                prop_assert_eq!(log.cursor(), before);
            }
            if direction == Direction::Latest {
                prop_assert!(!log.can_redo());
            }
        }
    }

    /// Property: commit after stepping back keeps exactly cursor + 1 entries.
    #[test]
    fn prop_commit_truncates_forward_branch(
        commits in 1usize..12,
        back in 0usize..12,
    ) {
        let mut log = HistoryLog::new(0usize);
        for i in 0..commits {
            log.commit(i + 1);
        }
        for _ in 0..back {
            log.navigate(Direction::Backward);
        }
        log.commit(99);
        prop_assert_eq!(log.len(), log.cursor() + 1);
        prop_assert_eq!(log.len(), commits.saturating_sub(back) + 2);
        prop_assert!(!log.can_redo());
    }

    /// Property: totals never decrease while rounds are played.
    #[test]
    fn prop_totals_are_monotonic(rounds in prop::collection::vec(test_gens::round(), 1..15)) {
        let mut game = new_game(flat_settings());
        for (team, color, raw) in rounds {
            if game.is_completed() {
                break;
            }
            let before = (game.stand(team).total, game.stand(team.opponent()).total);
            game.submit_round(team, color, raw, T0).unwrap();
            prop_assert!(game.stand(team).total >= before.0);
            prop_assert!(game.stand(team.opponent()).total >= before.1);
        }
    }

    /// Property: repeated Bedanken by the same team counts once.
    #[test]
    fn prop_bedanken_is_idempotent(team in test_gens::team(), repeats in 1usize..5) {
        let mut game = new_game(flat_settings());
        game.declare(Declaration::Berg, team.opponent(), T0).unwrap();
        for _ in 0..repeats {
            game.declare(Declaration::Bedanken, team, T0).unwrap();
        }
        prop_assert_eq!(game.stand(team).strokes.sieg, 1);
    }
}
