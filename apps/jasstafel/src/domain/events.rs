//! Events emitted by `SessionState` on every mutation.
//!
//! The session keeps them in an outbox; the sync layer drains the outbox
//! after each operation and relays the changes to storage.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::game::Declaration;
use crate::domain::records::{GameRecord, RoundRecord};
use crate::domain::session::GameSummary;
use crate::domain::team::TeamPosition;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    GameStarted {
        game_id: Uuid,
        sequence: u32,
    },
    RoundCommitted {
        game_id: Uuid,
        round: RoundRecord,
    },
    DeclarationApplied {
        game_id: Uuid,
        declaration: Declaration,
        team: TeamPosition,
        schneider_applied: bool,
    },
    WeisAdded {
        game_id: Uuid,
        team: TeamPosition,
        points: u32,
    },
    HistoryNavigated {
        game_id: Uuid,
        cursor: usize,
    },
    /// The current game was swapped for a stored document.
    GameReplaced {
        game_id: Uuid,
    },
    GameCompleted {
        record: GameRecord,
        summary: GameSummary,
    },
    SessionEnded {
        session_id: Uuid,
    },
}

impl DomainEvent {
    /// Game touched by this event, if it is about a single game.
    pub fn game_id(&self) -> Option<Uuid> {
        match self {
            DomainEvent::GameStarted { game_id, .. }
            | DomainEvent::RoundCommitted { game_id, .. }
            | DomainEvent::DeclarationApplied { game_id, .. }
            | DomainEvent::WeisAdded { game_id, .. }
            | DomainEvent::HistoryNavigated { game_id, .. }
            | DomainEvent::GameReplaced { game_id } => Some(*game_id),
            DomainEvent::GameCompleted { summary, .. } => Some(summary.game_id),
            DomainEvent::SessionEnded { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::GameStarted { .. } => "game_started",
            DomainEvent::RoundCommitted { .. } => "round_committed",
            DomainEvent::DeclarationApplied { .. } => "declaration_applied",
            DomainEvent::WeisAdded { .. } => "weis_added",
            DomainEvent::HistoryNavigated { .. } => "history_navigated",
            DomainEvent::GameReplaced { .. } => "game_replaced",
            DomainEvent::GameCompleted { .. } => "game_completed",
            DomainEvent::SessionEnded { .. } => "session_ended",
        }
    }
}
