//! Record shapes exchanged with the remote document store.
//!
//! Records are deliberately loose (signed counters, optional fields) so that
//! malformed documents can be read and judged instead of failing to parse.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::colors::JassColor;
use crate::domain::history::HistoryEntry;
use crate::domain::scoring::RoundScore;
use crate::domain::session::{GameSummary, SessionStatus, SessionTotals};
use crate::domain::settings::GameSettings;
use crate::domain::team::{TeamPair, TeamPosition};
use crate::domain::team_stand::StrokeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Completed,
    Aborted,
}

/// Stroke counters as stored; signed so negative values can be detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordStrokes {
    pub berg: i64,
    pub sieg: i64,
    pub matsch: i64,
    pub schneider: i64,
    pub kontermatsch: i64,
}

impl RecordStrokes {
    /// Sum of all counters, `None` on overflow.
    pub fn total(&self) -> Option<i64> {
        [self.sieg, self.matsch, self.schneider, self.kontermatsch]
            .iter()
            .try_fold(self.berg, |acc, v| acc.checked_add(*v))
    }

    pub fn has_negative(&self) -> bool {
        [
            self.berg,
            self.sieg,
            self.matsch,
            self.schneider,
            self.kontermatsch,
        ]
        .iter()
        .any(|v| *v < 0)
    }
}

impl From<StrokeRecord> for RecordStrokes {
    fn from(s: StrokeRecord) -> Self {
        Self {
            berg: i64::from(s.berg),
            sieg: i64::from(s.sieg),
            matsch: i64::from(s.matsch),
            schneider: i64::from(s.schneider),
            kontermatsch: i64::from(s.kontermatsch),
        }
    }
}

/// Persisted in-progress or finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: String,
    pub session_id: String,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub participant_ids: Vec<String>,
    #[serde(default)]
    pub current_round: i64,
    #[serde(default)]
    pub scores: TeamPair<i64>,
    #[serde(default)]
    pub strokes: TeamPair<RecordStrokes>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    pub status: GameStatus,
}

/// Append-only audit record of one submitted round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub game_id: String,
    pub session_id: String,
    pub round: u32,
    pub acting: TeamPosition,
    pub color: JassColor,
    pub raw_score: i32,
    pub multiplier: u8,
    pub score: RoundScore,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Full game state including its history, replaced wholesale on sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDocument {
    #[serde(flatten)]
    pub record: GameRecord,
    pub sequence: u32,
    #[serde(default)]
    pub winner: Option<TeamPosition>,
    pub entries: Vec<HistoryEntry>,
    pub cursor: usize,
}

/// Cumulative session document, rewritten whenever a game finalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub id: String,
    #[serde(default)]
    pub group_id: Option<String>,
    pub participant_ids: Vec<String>,
    pub settings: GameSettings,
    pub status: SessionStatus,
    pub games: Vec<GameSummary>,
    pub totals: SessionTotals,
    pub current_game_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
