//! A sitting of four players spanning one or more games.
//!
//! `SessionState` is the single owner of the current `GameState`. When a game
//! completes its totals are folded into the session and a fresh game starts
//! immediately, so there is always exactly one open game while the session is
//! active.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::domain::colors::JassColor;
use crate::domain::events::DomainEvent;
use crate::domain::game::{Declaration, DeclarationOutcome, GameState, RoundOutcome};
use crate::domain::history::Direction;
use crate::domain::records::{GameDocument, GameRecord, GameStatus, RoundRecord, SessionDocument};
use crate::domain::settings::GameSettings;
use crate::domain::team::{TeamPair, TeamPosition, PLAYERS};
use crate::domain::team_stand::StrokeRecord;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Final figures of a completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: Uuid,
    pub sequence: u32,
    pub totals: TeamPair<u32>,
    pub strokes: TeamPair<StrokeRecord>,
    pub stroke_totals: TeamPair<u32>,
    pub winner: TeamPosition,
    pub rounds: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

impl GameSummary {
    fn of(game: &GameState, winner: TeamPosition, completed_at: OffsetDateTime) -> Self {
        let stands = game.stands();
        Self {
            game_id: game.id(),
            sequence: game.sequence(),
            totals: stands.map(|_, s| s.total),
            strokes: stands.map(|_, s| s.strokes),
            stroke_totals: stands.map(|_, s| s.stroke_total),
            winner,
            rounds: game.history().cursor() as u32,
            completed_at,
        }
    }
}

/// Cumulative figures over all completed games of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTotals {
    pub points: TeamPair<u32>,
    pub strokes: TeamPair<StrokeRecord>,
    pub stroke_totals: TeamPair<u32>,
    pub games_won: TeamPair<u32>,
}

impl SessionTotals {
    fn fold(&mut self, summary: &GameSummary) {
        for team in TeamPosition::ALL {
            *self.points.get_mut(team) += *summary.totals.get(team);
            *self.stroke_totals.get_mut(team) += *summary.stroke_totals.get(team);
            let merged = self.strokes.get(team).merged(summary.strokes.get(team));
            *self.strokes.get_mut(team) = merged;
        }
        *self.games_won.get_mut(summary.winner) += 1;
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    group_id: Option<String>,
    participants: Vec<String>,
    settings: GameSettings,
    status: SessionStatus,
    games: Vec<GameSummary>,
    totals: SessionTotals,
    current: GameState,
    created_at: OffsetDateTime,
    events: Vec<DomainEvent>,
}

/// Exactly four distinct, non-empty participant ids.
pub fn validate_participants(participants: &[String]) -> Result<(), DomainError> {
    if participants.len() != PLAYERS {
        return Err(DomainError::validation(
            ValidationKind::NotEnoughPlayers,
            format!(
                "A session needs exactly {PLAYERS} players, got {}",
                participants.len()
            ),
        ));
    }
    if participants.iter().any(|p| p.trim().is_empty()) {
        return Err(DomainError::validation(
            ValidationKind::NotEnoughPlayers,
            "Every seat needs a selected player",
        ));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = participants.iter().find(|p| !seen.insert(p.as_str())) {
        return Err(DomainError::validation(
            ValidationKind::DuplicatePlayer,
            format!("Player '{dup}' is seated more than once"),
        ));
    }
    Ok(())
}

impl SessionState {
    pub fn start(
        participants: Vec<String>,
        settings: GameSettings,
        group_id: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        validate_participants(&participants)?;
        settings.validate()?;

        let id = Uuid::new_v4();
        let current = GameState::new(id, 1, settings.clone(), now);
        info!(session_id = %id, game_id = %current.id(), "session started");

        let mut session = Self {
            id,
            group_id,
            participants,
            settings,
            status: SessionStatus::Active,
            games: Vec::new(),
            totals: SessionTotals::default(),
            current,
            created_at: now,
            events: Vec::new(),
        };
        session.push_game_started();
        Ok(session)
    }

    /// Rebuild a session on a device that never held it, from the stored
    /// session document and the game it should continue with.
    pub fn restore(doc: SessionDocument, game: GameDocument) -> Result<Self, DomainError> {
        let id = Uuid::parse_str(&doc.id).map_err(|_| {
            DomainError::validation(
                ValidationKind::InvalidRecord,
                format!("session id '{}' is not a valid id", doc.id),
            )
        })?;
        if doc.status != SessionStatus::Active {
            return Err(DomainError::conflict(
                ConflictKind::SessionClosed,
                format!("Session {id} has ended"),
            ));
        }
        validate_participants(&doc.participant_ids)?;
        doc.settings.validate()?;
        if game.record.session_id != doc.id {
            return Err(DomainError::validation(
                ValidationKind::InvalidRecord,
                format!("Game {} does not belong to session {id}", game.record.id),
            ));
        }
        if game.record.status != GameStatus::Active {
            return Err(DomainError::conflict(
                ConflictKind::GameCompleted,
                format!("Game {} is no longer active", game.record.id),
            ));
        }

        let current = GameState::from_document(game, doc.settings.clone())?;
        info!(session_id = %id, game_id = %current.id(), "session restored");
        Ok(Self {
            id,
            group_id: doc.group_id,
            participants: doc.participant_ids,
            settings: doc.settings,
            status: doc.status,
            games: doc.games,
            totals: doc.totals,
            current,
            created_at: doc.created_at,
            events: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn games(&self) -> &[GameSummary] {
        &self.games
    }

    pub fn totals(&self) -> &SessionTotals {
        &self.totals
    }

    pub fn current(&self) -> &GameState {
        &self.current
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.status != SessionStatus::Active {
            return Err(DomainError::conflict(
                ConflictKind::SessionClosed,
                format!("Session {} has ended", self.id),
            ));
        }
        Ok(())
    }

    fn push_game_started(&mut self) {
        self.events.push(DomainEvent::GameStarted {
            game_id: self.current.id(),
            sequence: self.current.sequence(),
        });
    }

    pub fn submit_round(
        &mut self,
        acting: TeamPosition,
        color: JassColor,
        raw_score: i32,
        now: OffsetDateTime,
    ) -> Result<RoundOutcome, DomainError> {
        self.ensure_active()?;
        let outcome = self.current.submit_round(acting, color, raw_score, now)?;
        self.events.push(DomainEvent::RoundCommitted {
            game_id: self.current.id(),
            round: RoundRecord {
                game_id: self.current.id().to_string(),
                session_id: self.id.to_string(),
                round: outcome.round,
                acting,
                color,
                raw_score,
                multiplier: outcome.multiplier,
                score: outcome.score,
                timestamp: now,
            },
        });
        if let Some(winner) = outcome.winner {
            self.finish_game(winner, now);
        }
        Ok(outcome)
    }

    pub fn declare(
        &mut self,
        declaration: Declaration,
        team: TeamPosition,
        now: OffsetDateTime,
    ) -> Result<DeclarationOutcome, DomainError> {
        self.ensure_active()?;
        let outcome = self.current.declare(declaration, team, now)?;
        if outcome.applied {
            self.events.push(DomainEvent::DeclarationApplied {
                game_id: self.current.id(),
                declaration,
                team,
                schneider_applied: outcome.schneider_applied,
            });
        }
        if let Some(winner) = outcome.winner {
            self.finish_game(winner, now);
        }
        Ok(outcome)
    }

    pub fn add_weis(
        &mut self,
        team: TeamPosition,
        points: u32,
        now: OffsetDateTime,
    ) -> Result<Option<TeamPosition>, DomainError> {
        self.ensure_active()?;
        let winner = self.current.add_weis(team, points, now)?;
        self.events.push(DomainEvent::WeisAdded {
            game_id: self.current.id(),
            team,
            points,
        });
        if let Some(winner) = winner {
            self.finish_game(winner, now);
        }
        Ok(winner)
    }

    pub fn navigate(&mut self, direction: Direction) -> Result<bool, DomainError> {
        self.ensure_active()?;
        let moved = self.current.navigate(direction)?;
        if moved {
            self.events.push(DomainEvent::HistoryNavigated {
                game_id: self.current.id(),
                cursor: self.current.history().cursor(),
            });
        }
        Ok(moved)
    }

    /// Archive the session. The open game is left behind as aborted.
    pub fn end(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.status = SessionStatus::Completed;
        info!(session_id = %self.id, games = self.games.len(), "session ended");
        self.events.push(DomainEvent::SessionEnded { session_id: self.id });
        Ok(())
    }

    /// Swap the open game for a stored document (resume or inbound sync).
    pub fn replace_game(&mut self, doc: GameDocument) -> Result<(), DomainError> {
        self.ensure_active()?;
        if doc.record.session_id != self.id.to_string() {
            return Err(DomainError::validation(
                ValidationKind::InvalidRecord,
                format!(
                    "Game {} belongs to session {}, not {}",
                    doc.record.id, doc.record.session_id, self.id
                ),
            ));
        }
        if doc.record.status != GameStatus::Active {
            return Err(DomainError::conflict(
                ConflictKind::GameCompleted,
                format!("Game {} is no longer active", doc.record.id),
            ));
        }
        let game = GameState::from_document(doc, self.settings.clone())?;
        self.current = game;
        self.events.push(DomainEvent::GameReplaced {
            game_id: self.current.id(),
        });
        Ok(())
    }

    fn finish_game(&mut self, winner: TeamPosition, now: OffsetDateTime) {
        let record = self.current.to_record(
            &self.participants,
            self.group_id.as_deref(),
            GameStatus::Completed,
        );
        let summary = GameSummary::of(&self.current, winner, now);
        self.totals.fold(&summary);
        self.games.push(summary.clone());
        info!(
            session_id = %self.id,
            game_id = %summary.game_id,
            winner = winner.as_str(),
            top = summary.totals.top,
            bottom = summary.totals.bottom,
            "game completed"
        );
        self.events
            .push(DomainEvent::GameCompleted { record, summary });

        self.current = GameState::new(
            self.id,
            self.current.sequence() + 1,
            self.settings.clone(),
            now,
        );
        self.push_game_started();
    }

    /// Storage status of the open game.
    pub fn current_status(&self) -> GameStatus {
        if self.current.is_completed() {
            GameStatus::Completed
        } else if self.status == SessionStatus::Completed {
            GameStatus::Aborted
        } else {
            GameStatus::Active
        }
    }

    pub fn current_record(&self) -> GameRecord {
        self.current
            .to_record(&self.participants, self.group_id.as_deref(), self.current_status())
    }

    pub fn current_document(&self) -> GameDocument {
        self.current
            .to_document(&self.participants, self.group_id.as_deref(), self.current_status())
    }

    pub fn to_document(&self) -> SessionDocument {
        SessionDocument {
            id: self.id.to_string(),
            group_id: self.group_id.clone(),
            participant_ids: self.participants.clone(),
            settings: self.settings.clone(),
            status: self.status,
            games: self.games.clone(),
            totals: self.totals.clone(),
            current_game_id: self.current.id().to_string(),
            created_at: self.created_at,
        }
    }
}
