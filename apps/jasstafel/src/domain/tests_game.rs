use crate::domain::colors::JassColor;
use crate::domain::game::{Declaration, GameState};
use crate::domain::history::Direction;
use crate::domain::records::GameStatus;
use crate::domain::settings::GameSettings;
use crate::domain::tally::{Denomination, TallyGroup};
use crate::domain::team::TeamPosition::{Bottom, Top};
use crate::domain::test_state_helpers::{flat_settings, new_game, play, players, T0};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

#[test]
fn eicheln_round_with_triple_multiplier() {
    let mut settings = GameSettings::default();
    settings.color_multipliers = settings.color_multipliers.clone().with(JassColor::Eicheln, 3);
    let mut game = new_game(settings);

    let outcome = game.submit_round(Bottom, JassColor::Eicheln, 80, T0).unwrap();

    assert_eq!(outcome.score.acting_score, 240);
    assert_eq!(outcome.score.opponent_score, 231);
    assert_eq!(game.stand(Bottom).total, 240);
    assert_eq!(game.stand(Top).total, 231);
    assert_eq!(game.round(), 2);
    assert_eq!(game.active_player(), 2);
    assert_eq!(game.last_color(), Some(JassColor::Eicheln));
}

#[test]
fn matsch_round_leaves_opponent_unchanged() {
    let mut game = new_game(GameSettings::default());
    game.submit_round(Top, JassColor::Obe, 257, T0).unwrap();
    assert_eq!(game.stand(Top).total, 257 * 3);
    assert_eq!(game.stand(Bottom).total, 0);
}

#[test]
fn out_of_range_score_is_rejected_without_side_effects() {
    let mut game = new_game(flat_settings());
    for raw in [158, -1, 256, 300] {
        let err = game.submit_round(Top, JassColor::Rosen, raw, T0).unwrap_err();
        assert_eq!(err.validation_kind(), Some(&ValidationKind::ScoreOutOfRange));
    }
    assert_eq!(game.history().len(), 1);
    assert_eq!(game.round(), 1);
}

#[test]
fn active_player_credits_points() {
    let mut game = new_game(flat_settings());
    // Player 1 (bottom) acts in round 1.
    game.submit_round(Bottom, JassColor::Rosen, 100, T0).unwrap();
    assert_eq!(game.stand(Bottom).players[&1].points, 100);
    // Player 2 (top) is active in round 2 but bottom acts.
    game.submit_round(Bottom, JassColor::Rosen, 100, T0).unwrap();
    assert_eq!(game.stand(Bottom).players[&1].points, 100);
    assert_eq!(game.stand(Bottom).players[&3].points, 0);
    assert_eq!(game.stand(Top).players[&2].points, 57);
}

#[test]
fn reaching_sieg_completes_game() {
    let mut game = new_game(flat_settings());
    play(&mut game, Bottom, &[257; 7]);
    assert!(!game.is_completed());

    let outcome = game.submit_round(Bottom, JassColor::Rosen, 257, T0).unwrap();
    assert_eq!(outcome.winner, Some(Bottom));
    assert!(game.is_completed());

    let err = game
        .submit_round(Top, JassColor::Rosen, 10, T0)
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::GameCompleted, _)));
    assert!(!game.can_declare(Declaration::Matsch, Top));
}

#[test]
fn berg_is_one_shot_and_respects_toggle() {
    let mut game = new_game(flat_settings());
    assert!(game.declare(Declaration::Berg, Top, T0).unwrap().applied);
    assert!(!game.declare(Declaration::Berg, Top, T0).unwrap().applied);
    assert_eq!(game.stand(Top).strokes.berg, 1);
    assert_eq!(game.stand(Top).stroke_total, 1);

    let mut settings = flat_settings();
    settings.enabled.berg = false;
    let mut game = new_game(settings);
    assert!(!game.declare(Declaration::Berg, Top, T0).unwrap().applied);
    assert_eq!(game.remaining_to_berg(Top), None);
}

#[test]
fn berg_eligibility_needs_target() {
    let mut game = new_game(flat_settings());
    assert!(!game.can_declare(Declaration::Berg, Bottom));
    play(&mut game, Bottom, &[157; 7]);
    assert_eq!(game.stand(Bottom).total, 1099);
    assert!(game.can_declare(Declaration::Berg, Bottom));
    assert!(!game.can_declare(Declaration::Berg, Top));
    assert_eq!(game.remaining_to_berg(Bottom), Some(0));
    assert_eq!(game.remaining_to_sieg(Bottom), 901);
}

#[test]
fn bedanken_requires_berg_and_awards_schneider() {
    let mut game = new_game(flat_settings());
    assert!(!game.declare(Declaration::Bedanken, Bottom, T0).unwrap().applied);
    assert!(!game.can_declare(Declaration::Bedanken, Bottom));

    game.declare(Declaration::Berg, Top, T0).unwrap();
    let outcome = game.declare(Declaration::Bedanken, Bottom, T0).unwrap();
    assert!(outcome.applied);
    assert!(outcome.schneider_applied);

    let bottom = game.stand(Bottom);
    assert_eq!(bottom.strokes.sieg, 1);
    assert_eq!(bottom.strokes.schneider, 1);
    assert_eq!(bottom.stroke_total, 2 + 2);
    assert!(bottom.bedanken_active);
}

#[test]
fn bedanken_twice_increments_sieg_once() {
    let mut game = new_game(flat_settings());
    game.declare(Declaration::Berg, Bottom, T0).unwrap();
    game.declare(Declaration::Bedanken, Bottom, T0).unwrap();
    assert!(!game.declare(Declaration::Bedanken, Bottom, T0).unwrap().applied);
    assert_eq!(game.stand(Bottom).strokes.sieg, 1);
    // The other team cannot bedanken once one team has.
    assert!(!game.declare(Declaration::Bedanken, Top, T0).unwrap().applied);
    assert_eq!(game.stand(Top).strokes.sieg, 0);
}

#[test]
fn no_schneider_when_opponent_passed_threshold() {
    let mut game = new_game(flat_settings());
    play(&mut game, Top, &[157; 7]);
    game.declare(Declaration::Berg, Top, T0).unwrap();
    let outcome = game.declare(Declaration::Bedanken, Bottom, T0).unwrap();
    assert!(outcome.applied);
    assert!(!outcome.schneider_applied);
    assert_eq!(game.stand(Bottom).strokes.schneider, 0);
}

#[test]
fn schneider_disabled_by_toggle_or_rule() {
    for disable in [true, false] {
        let mut settings = flat_settings();
        if disable {
            settings.enabled.schneider = false;
        } else {
            settings.stroke_rules.schneider = 0;
        }
        let mut game = new_game(settings);
        game.declare(Declaration::Berg, Top, T0).unwrap();
        let outcome = game.declare(Declaration::Bedanken, Bottom, T0).unwrap();
        assert!(outcome.applied);
        assert!(!outcome.schneider_applied);
    }
}

#[test]
fn kontermatsch_only_against_round_actor() {
    let mut game = new_game(flat_settings());
    assert!(!game.declare(Declaration::Kontermatsch, Top, T0).unwrap().applied);

    game.submit_round(Top, JassColor::Rosen, 100, T0).unwrap();
    assert!(!game.declare(Declaration::Kontermatsch, Top, T0).unwrap().applied);
    assert!(game.can_declare(Declaration::Kontermatsch, Bottom));
    assert!(game.declare(Declaration::Kontermatsch, Bottom, T0).unwrap().applied);

    let bottom = game.stand(Bottom);
    assert_eq!(bottom.strokes.kontermatsch, 1);
    assert_eq!(bottom.stroke_total, 2);
}

#[test]
fn kontermatsch_rule_zero_is_noop() {
    let mut settings = flat_settings();
    settings.stroke_rules.kontermatsch = 0;
    let mut game = new_game(settings);
    game.submit_round(Top, JassColor::Rosen, 100, T0).unwrap();
    assert!(!game.declare(Declaration::Kontermatsch, Bottom, T0).unwrap().applied);
}

#[test]
fn navigation_re_derives_visible_state() {
    let mut game = new_game(flat_settings());
    play(&mut game, Bottom, &[100, 60, 20]);
    assert_eq!(game.stand(Bottom).total, 180);

    assert!(game.navigate(Direction::Backward).unwrap());
    assert_eq!(game.round(), 3);
    assert_eq!(game.active_player(), 3);
    assert_eq!(game.stand(Bottom).total, 160);
    assert_eq!(game.stand(Top).total, 57 + 97);

    assert!(game.navigate(Direction::Forward).unwrap());
    assert!(!game.navigate(Direction::Forward).unwrap());
    assert_eq!(game.stand(Bottom).total, 180);
}

#[test]
fn round_after_undo_discards_forward_entries() {
    let mut game = new_game(flat_settings());
    play(&mut game, Bottom, &[100, 60, 20]);
    game.navigate(Direction::Backward).unwrap();
    game.navigate(Direction::Backward).unwrap();

    game.submit_round(Top, JassColor::Rosen, 10, T0).unwrap();
    assert_eq!(game.history().len(), game.history().cursor() + 1);
    assert_eq!(game.history().len(), 3);
    assert!(!game.history().can_redo());
    assert_eq!(game.stand(Bottom).total, 100 + 147);
}

#[test]
fn declaration_amends_cursor_entry() {
    let mut game = new_game(flat_settings());
    play(&mut game, Bottom, &[100, 60]);
    game.navigate(Direction::Backward).unwrap();

    game.declare(Declaration::Matsch, Bottom, T0).unwrap();
    assert_eq!(game.history().len(), 2);
    assert_eq!(game.history().current().bottom_strokes().matsch, 1);
    assert_eq!(game.round(), 2);
}

#[test]
fn weis_is_validated_and_can_finish_game() {
    let mut game = new_game(flat_settings());
    for points in [0, 1001] {
        let err = game.add_weis(Top, points, T0).unwrap_err();
        assert_eq!(err.validation_kind(), Some(&ValidationKind::InvalidWeis));
    }

    assert_eq!(game.add_weis(Top, 150, T0).unwrap(), None);
    assert_eq!(game.stand(Top).weis_points, 150);
    assert_eq!(game.stand(Top).total, 150);
    assert_eq!(game.history().len(), 1);

    game.add_weis(Top, 1000, T0).unwrap();
    assert_eq!(game.add_weis(Top, 900, T0).unwrap(), Some(Top));
    assert!(game.is_completed());
}

#[test]
fn tally_follows_point_breakdown() {
    let mut game = new_game(flat_settings());
    game.submit_round(Bottom, JassColor::Rosen, 157, T0).unwrap();
    game.add_weis(Bottom, 138, T0).unwrap();
    // 295 = 2x100 + 50 + 2x20 + 5
    let breakdown = game.breakdown(Bottom);
    assert_eq!(breakdown.hundreds, 2);
    assert_eq!(breakdown.fifties, 1);
    assert_eq!(breakdown.twenties, 2);
    assert_eq!(breakdown.remainder, 5);
    assert_eq!(
        game.tally(Bottom, Denomination::Hundred).groups,
        vec![TallyGroup::Ticks { count: 2 }]
    );
    assert!(game.tally(Top, Denomination::Fifty).is_empty());
}

#[test]
fn document_round_trip_restores_game() {
    let mut game = new_game(flat_settings());
    play(&mut game, Bottom, &[100, 60]);
    game.declare(Declaration::Berg, Top, T0).unwrap();
    game.navigate(Direction::Backward).unwrap();

    let doc = game.to_document(&players(), Some("grp"), GameStatus::Active);
    assert_eq!(doc.record.current_round, 2);
    assert_eq!(doc.record.scores.bottom, 100);

    let json = serde_json::to_string(&doc).unwrap();
    let parsed = serde_json::from_str(&json).unwrap();
    let restored = GameState::from_document(parsed, flat_settings()).unwrap();
    assert_eq!(restored, game);
}

#[test]
fn from_document_rejects_bad_ids_and_cursor() {
    let game = new_game(flat_settings());
    let mut doc = game.to_document(&players(), None, GameStatus::Active);
    doc.cursor = 5;
    assert!(GameState::from_document(doc.clone(), flat_settings()).is_err());
    doc.cursor = 0;
    doc.record.id = "not-a-uuid".into();
    let err = GameState::from_document(doc, flat_settings()).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::InvalidRecord));
}
