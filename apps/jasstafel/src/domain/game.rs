//! One match between the two teams.
//!
//! The visible state of a game (team stands, round number, active player) is
//! always read from the history entry at the cursor. Every mutation builds a
//! new snapshot and either commits it (rounds) or amends the cursor entry
//! (declarations, Weis).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::domain::colors::JassColor;
use crate::domain::history::{Direction, EntryKind, HistoryEntry, HistoryLog};
use crate::domain::records::{GameDocument, GameRecord, GameStatus, RecordStrokes};
use crate::domain::scoring::{self, RoundScore};
use crate::domain::settings::GameSettings;
use crate::domain::tally::{self, Denomination, PointBreakdown, TallyShape};
use crate::domain::team::{player_for_index, PlayerNumber, TeamPair, TeamPosition};
use crate::domain::team_stand::{add_round, TeamStand};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// Largest Weis a single call may add.
pub const MAX_WEIS_POINTS: u32 = 1000;

/// User-invoked declarations. Schneider is never declared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Declaration {
    Berg,
    Bedanken,
    Matsch,
    Kontermatsch,
}

impl Declaration {
    pub const ALL: [Declaration; 4] = [
        Declaration::Berg,
        Declaration::Bedanken,
        Declaration::Matsch,
        Declaration::Kontermatsch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Declaration::Berg => "berg",
            Declaration::Bedanken => "bedanken",
            Declaration::Matsch => "matsch",
            Declaration::Kontermatsch => "kontermatsch",
        }
    }
}

impl std::fmt::Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Declaration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Declaration::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown declaration '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    /// Number of the round that was just played (1-based).
    pub round: u32,
    pub acting: TeamPosition,
    pub color: JassColor,
    pub raw_score: i32,
    pub multiplier: u8,
    pub score: RoundScore,
    /// Set when this round ended the game.
    pub winner: Option<TeamPosition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationOutcome {
    pub applied: bool,
    /// Schneider was awarded along with a Bedanken.
    pub schneider_applied: bool,
    pub winner: Option<TeamPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    id: Uuid,
    session_id: Uuid,
    sequence: u32,
    settings: GameSettings,
    history: HistoryLog<HistoryEntry>,
    completed: bool,
    winner: Option<TeamPosition>,
    created_at: OffsetDateTime,
}

impl GameState {
    pub fn new(session_id: Uuid, sequence: u32, settings: GameSettings, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            sequence,
            settings,
            history: HistoryLog::new(HistoryEntry::start(now)),
            completed: false,
            winner: None,
            created_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn history(&self) -> &HistoryLog<HistoryEntry> {
        &self.history
    }

    pub fn stands(&self) -> &TeamPair<TeamStand> {
        &self.history.current().stands
    }

    pub fn stand(&self, team: TeamPosition) -> &TeamStand {
        self.stands().get(team)
    }

    /// Round currently being played (1-based).
    pub fn round(&self) -> u32 {
        self.history.cursor() as u32 + 1
    }

    pub fn active_player(&self) -> PlayerNumber {
        player_for_index(self.history.cursor())
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn winner(&self) -> Option<TeamPosition> {
        self.winner
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn last_color(&self) -> Option<JassColor> {
        self.history.current().color_played
    }

    pub fn remaining_to_sieg(&self, team: TeamPosition) -> u32 {
        self.settings
            .score_targets
            .sieg
            .saturating_sub(self.stand(team).total)
    }

    /// `None` when Berg is disabled for this game.
    pub fn remaining_to_berg(&self, team: TeamPosition) -> Option<u32> {
        self.settings.enabled.berg.then(|| {
            self.settings
                .score_targets
                .berg
                .saturating_sub(self.stand(team).total)
        })
    }

    pub fn breakdown(&self, team: TeamPosition) -> PointBreakdown {
        tally::breakdown(self.stand(team).total)
    }

    /// Board tally of a team's points at one denomination.
    pub fn tally(&self, team: TeamPosition, denomination: Denomination) -> TallyShape {
        tally::encode(self.breakdown(team).count_for(denomination), denomination)
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.completed {
            return Err(DomainError::conflict(
                ConflictKind::GameCompleted,
                format!("Game {} is already completed", self.id),
            ));
        }
        Ok(())
    }

    pub fn submit_round(
        &mut self,
        acting: TeamPosition,
        color: JassColor,
        raw_score: i32,
        now: OffsetDateTime,
    ) -> Result<RoundOutcome, DomainError> {
        self.ensure_open()?;
        let multiplier = self.settings.multiplier(color)?;
        let score = scoring::apply(raw_score, multiplier)?;
        let round = self.round();

        let mut stands = self.stands().clone();
        add_round(&mut stands, acting, score, self.active_player());
        self.history.commit(HistoryEntry {
            kind: EntryKind::Round { acting, raw_score },
            stands,
            color_played: Some(color),
            multiplier_applied: multiplier,
            timestamp: now,
        });

        Ok(RoundOutcome {
            round,
            acting,
            color,
            raw_score,
            multiplier,
            score,
            winner: self.check_completion(acting),
        })
    }

    fn berg_satisfied(&self) -> bool {
        let stands = self.stands();
        !self.settings.enabled.berg || stands.top.berg_active || stands.bottom.berg_active
    }

    fn bedanken_allowed(&self) -> bool {
        let stands = self.stands();
        self.berg_satisfied() && !stands.top.bedanken_active && !stands.bottom.bedanken_active
    }

    fn kontermatsch_allowed(&self, team: TeamPosition) -> bool {
        self.settings.stroke_rules.kontermatsch > 0
            && self.history.current().actor() == Some(team.opponent())
    }

    /// Whether `declaration` would currently be applied for `team`. Berg
    /// additionally requires the team to have reached the Berg target.
    pub fn can_declare(&self, declaration: Declaration, team: TeamPosition) -> bool {
        if self.completed {
            return false;
        }
        match declaration {
            Declaration::Berg => {
                self.settings.enabled.berg
                    && !self.stand(team).berg_active
                    && self.stand(team).total >= self.settings.score_targets.berg
            }
            Declaration::Bedanken => self.bedanken_allowed(),
            Declaration::Matsch => true,
            Declaration::Kontermatsch => self.kontermatsch_allowed(team),
        }
    }

    pub fn declare(
        &mut self,
        declaration: Declaration,
        team: TeamPosition,
        now: OffsetDateTime,
    ) -> Result<DeclarationOutcome, DomainError> {
        self.ensure_open()?;
        let player = self.active_player();
        let rules = self.settings.stroke_rules;
        let enabled = self.settings.enabled;
        let mut stands = self.stands().clone();
        let mut schneider_applied = false;

        let applied = match declaration {
            Declaration::Berg => enabled.berg && stands.get_mut(team).declare_berg(player),
            Declaration::Bedanken => {
                let applied = self.bedanken_allowed() && stands.get_mut(team).declare_bedanken(player);
                if applied
                    && enabled.schneider
                    && stands.get(team.opponent()).total < self.settings.score_targets.schneider
                {
                    schneider_applied = stands.get_mut(team).apply_schneider(rules.schneider, player);
                }
                applied
            }
            Declaration::Matsch => stands.get_mut(team).declare_matsch(player),
            Declaration::Kontermatsch => {
                self.kontermatsch_allowed(team)
                    && stands
                        .get_mut(team)
                        .declare_kontermatsch(rules.kontermatsch, player)
            }
        };

        if !applied {
            debug!(game_id = %self.id, %declaration, team = team.as_str(), "declaration ignored");
            return Ok(DeclarationOutcome::default());
        }

        self.amend(stands, now);
        Ok(DeclarationOutcome {
            applied: true,
            schneider_applied,
            winner: self.check_completion(team),
        })
    }

    pub fn add_weis(
        &mut self,
        team: TeamPosition,
        points: u32,
        now: OffsetDateTime,
    ) -> Result<Option<TeamPosition>, DomainError> {
        self.ensure_open()?;
        if points == 0 || points > MAX_WEIS_POINTS {
            return Err(DomainError::validation(
                ValidationKind::InvalidWeis,
                format!("Weis must be between 1 and {MAX_WEIS_POINTS} points, got {points}"),
            ));
        }
        let mut stands = self.stands().clone();
        stands.get_mut(team).add_weis_points(points, self.active_player());
        self.amend(stands, now);
        Ok(self.check_completion(team))
    }

    /// Returns whether the cursor moved.
    pub fn navigate(&mut self, direction: Direction) -> Result<bool, DomainError> {
        self.ensure_open()?;
        let before = self.history.cursor();
        self.history.navigate(direction);
        Ok(self.history.cursor() != before)
    }

    fn amend(&mut self, stands: TeamPair<TeamStand>, now: OffsetDateTime) {
        let current = self.history.current();
        let entry = HistoryEntry {
            kind: current.kind,
            stands,
            color_played: current.color_played,
            multiplier_applied: current.multiplier_applied,
            timestamp: now,
        };
        self.history.amend(entry);
    }

    fn check_completion(&mut self, acting: TeamPosition) -> Option<TeamPosition> {
        let stands = self.stands();
        let sieg = self.settings.score_targets.sieg;
        if stands.top.total < sieg && stands.bottom.total < sieg {
            return None;
        }
        let winner = match stands.top.total.cmp(&stands.bottom.total) {
            Ordering::Greater => TeamPosition::Top,
            Ordering::Less => TeamPosition::Bottom,
            Ordering::Equal => acting,
        };
        self.completed = true;
        self.winner = Some(winner);
        Some(winner)
    }

    pub fn to_record(
        &self,
        participant_ids: &[String],
        group_id: Option<&str>,
        status: GameStatus,
    ) -> GameRecord {
        let stands = self.stands();
        GameRecord {
            id: self.id.to_string(),
            session_id: self.session_id.to_string(),
            group_id: group_id.map(str::to_string),
            participant_ids: participant_ids.to_vec(),
            current_round: i64::from(self.round()),
            scores: stands.map(|_, s| i64::from(s.total)),
            strokes: stands.map(|_, s| RecordStrokes::from(s.strokes)),
            created_at: Some(self.created_at),
            status,
        }
    }

    pub fn to_document(
        &self,
        participant_ids: &[String],
        group_id: Option<&str>,
        status: GameStatus,
    ) -> GameDocument {
        GameDocument {
            record: self.to_record(participant_ids, group_id, status),
            sequence: self.sequence,
            winner: self.winner,
            entries: self.history.entries().to_vec(),
            cursor: self.history.cursor(),
        }
    }

    /// Rebuild a game from a stored document; the document replaces any local
    /// state wholesale.
    pub fn from_document(doc: GameDocument, settings: GameSettings) -> Result<Self, DomainError> {
        let parse = |label: &str, raw: &str| {
            Uuid::parse_str(raw).map_err(|_| {
                DomainError::validation(
                    ValidationKind::InvalidRecord,
                    format!("{label} '{raw}' is not a valid id"),
                )
            })
        };
        let id = parse("game id", &doc.record.id)?;
        let session_id = parse("session id", &doc.record.session_id)?;
        let history = HistoryLog::from_parts(doc.entries, doc.cursor)?;
        let created_at = doc
            .record
            .created_at
            .unwrap_or_else(|| history.entries()[0].timestamp);

        Ok(Self {
            id,
            session_id,
            sequence: doc.sequence,
            settings,
            history,
            completed: doc.record.status == GameStatus::Completed,
            winner: doc.winner,
            created_at,
        })
    }
}
