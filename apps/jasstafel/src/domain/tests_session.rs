use crate::domain::colors::JassColor;
use crate::domain::events::DomainEvent;
use crate::domain::game::Declaration;
use crate::domain::history::Direction;
use crate::domain::records::GameStatus;
use crate::domain::session::{SessionState, SessionStatus};
use crate::domain::settings::GameSettings;
use crate::domain::team::TeamPosition::{Bottom, Top};
use crate::domain::test_state_helpers::{flat_settings, new_session, players, T0};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

fn seats(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn start_requires_four_distinct_players() {
    let err = SessionState::start(seats(&["a", "b", "c"]), GameSettings::default(), None, T0)
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotEnoughPlayers));

    let err = SessionState::start(seats(&["a", "b", "", "d"]), GameSettings::default(), None, T0)
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotEnoughPlayers));

    let err = SessionState::start(seats(&["a", "b", "a", "d"]), GameSettings::default(), None, T0)
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::DuplicatePlayer));
}

#[test]
fn start_validates_settings() {
    let mut settings = GameSettings::default();
    settings.score_targets.berg = 5000;
    let err = SessionState::start(players(), settings, None, T0).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::InvalidSettings));
}

#[test]
fn start_emits_game_started() {
    let mut session = new_session(flat_settings());
    let events = session.drain_events();
    assert_eq!(
        events,
        vec![DomainEvent::GameStarted {
            game_id: session.current().id(),
            sequence: 1
        }]
    );
    assert!(session.drain_events().is_empty());
}

#[test]
fn completed_game_folds_into_totals_and_starts_next() {
    let mut session = new_session(flat_settings());
    let first_game = session.current().id();
    session.declare(Declaration::Berg, Bottom, T0).unwrap();
    session.drain_events();

    for _ in 0..7 {
        session.submit_round(Bottom, JassColor::Rosen, 257, T0).unwrap();
    }
    let outcome = session.submit_round(Bottom, JassColor::Rosen, 257, T0).unwrap();
    assert_eq!(outcome.winner, Some(Bottom));

    assert_eq!(session.games().len(), 1);
    let summary = &session.games()[0];
    assert_eq!(summary.game_id, first_game);
    assert_eq!(summary.winner, Bottom);
    assert_eq!(summary.totals.bottom, 257 * 8);
    assert_eq!(summary.rounds, 8);

    let totals = session.totals();
    assert_eq!(totals.points.bottom, 257 * 8);
    assert_eq!(totals.points.top, 0);
    assert_eq!(totals.games_won.bottom, 1);
    assert_eq!(totals.strokes.bottom.berg, 1);
    assert_eq!(totals.stroke_totals.bottom, 1);

    let next = session.current();
    assert_ne!(next.id(), first_game);
    assert_eq!(next.sequence(), 2);
    assert_eq!(next.stand(Bottom).total, 0);
    assert!(!next.is_completed());

    let names: Vec<&str> = session.drain_events().iter().map(DomainEvent::name).collect();
    assert_eq!(names.len(), 10);
    assert_eq!(&names[7..], ["round_committed", "game_completed", "game_started"]);
}

#[test]
fn completed_event_carries_final_record() {
    let mut session = new_session(flat_settings());
    session.drain_events();
    session.add_weis(Top, 1000, T0).unwrap();
    session.add_weis(Top, 1000, T0).unwrap();

    let completed = session
        .drain_events()
        .into_iter()
        .find_map(|e| match e {
            DomainEvent::GameCompleted { record, .. } => Some(record),
            _ => None,
        })
        .unwrap();
    assert_eq!(completed.status, GameStatus::Completed);
    assert_eq!(completed.scores.top, 2000);
    assert_eq!(completed.participant_ids, players());
}

#[test]
fn guard_violations_emit_no_event() {
    let mut session = new_session(flat_settings());
    session.drain_events();
    let outcome = session.declare(Declaration::Bedanken, Top, T0).unwrap();
    assert!(!outcome.applied);
    assert!(!session.navigate(Direction::Backward).unwrap());
    assert!(session.drain_events().is_empty());
}

#[test]
fn ended_session_rejects_mutations() {
    let mut session = new_session(flat_settings());
    session.submit_round(Top, JassColor::Rosen, 50, T0).unwrap();
    session.end().unwrap();
    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.current_status(), GameStatus::Aborted);

    let err = session
        .submit_round(Top, JassColor::Rosen, 50, T0)
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::SessionClosed, _)));
    assert!(session.end().is_err());
}

#[test]
fn replace_game_swaps_current_wholesale() {
    let mut session = new_session(flat_settings());
    session.submit_round(Top, JassColor::Rosen, 50, T0).unwrap();
    let snapshot = session.current_document();

    session.submit_round(Top, JassColor::Rosen, 70, T0).unwrap();
    session.declare(Declaration::Matsch, Bottom, T0).unwrap();
    session.drain_events();

    session.replace_game(snapshot.clone()).unwrap();
    assert_eq!(session.current_document(), snapshot);
    assert_eq!(session.current().round(), 2);
    assert_eq!(session.current().stand(Bottom).strokes.matsch, 0);
    assert!(matches!(
        session.drain_events().as_slice(),
        [DomainEvent::GameReplaced { .. }]
    ));
}

#[test]
fn replace_game_rejects_foreign_or_finished_documents() {
    let mut session = new_session(flat_settings());
    let other = new_session(flat_settings());

    let err = session.replace_game(other.current_document()).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::InvalidRecord));

    let mut finished = session.current_document();
    finished.record.status = GameStatus::Completed;
    assert!(matches!(
        session.replace_game(finished),
        Err(DomainError::Conflict(ConflictKind::GameCompleted, _))
    ));
}

#[test]
fn restore_rebuilds_session_from_documents() {
    let mut session = new_session(flat_settings());
    session.add_weis(Top, 1000, T0).unwrap();
    session.add_weis(Top, 1000, T0).unwrap();
    session.submit_round(Bottom, JassColor::Rosen, 100, T0).unwrap();

    let restored = SessionState::restore(session.to_document(), session.current_document()).unwrap();
    assert_eq!(restored.id(), session.id());
    assert_eq!(restored.games().len(), 1);
    assert_eq!(restored.totals(), session.totals());
    assert_eq!(restored.current().id(), session.current().id());
    assert_eq!(restored.current().stand(Bottom).total, 100);
}

#[test]
fn restore_rejects_ended_sessions_and_foreign_games() {
    let mut session = new_session(flat_settings());
    let other = new_session(flat_settings());

    let err = SessionState::restore(session.to_document(), other.current_document()).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::InvalidRecord));

    session.end().unwrap();
    let err = SessionState::restore(session.to_document(), session.current_document()).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::SessionClosed, _)));
}

#[test]
fn session_document_tracks_current_game() {
    let session = new_session(flat_settings());
    let doc = session.to_document();
    assert_eq!(doc.current_game_id, session.current().id().to_string());
    assert_eq!(doc.status, SessionStatus::Active);
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["participantIds"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["settings"]["scoreTargets"]["sieg"], 2000);
}
