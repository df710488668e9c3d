//! Running tally of one team inside a game.
//!
//! A `TeamStand` only knows how to add points and record strokes. Cross-team
//! guards (Bedanken exclusivity, Kontermatsch against the round's actor) are
//! enforced by `GameState`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::scoring::RoundScore;
use crate::domain::team::{PlayerNumber, TeamPair, TeamPosition};

/// Stroke value of a Berg declaration.
pub const BERG_STROKES: u32 = 1;
/// Stroke value of a Bedanken (Sieg) declaration.
pub const BEDANKEN_STROKES: u32 = 2;
/// Stroke value of a Matsch declaration.
pub const MATSCH_STROKES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Berg,
    Sieg,
    Matsch,
    Schneider,
    Kontermatsch,
}

/// Number of declarations of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub berg: u32,
    pub sieg: u32,
    pub matsch: u32,
    pub schneider: u32,
    pub kontermatsch: u32,
}

impl StrokeRecord {
    pub fn get(&self, kind: StrokeKind) -> u32 {
        match kind {
            StrokeKind::Berg => self.berg,
            StrokeKind::Sieg => self.sieg,
            StrokeKind::Matsch => self.matsch,
            StrokeKind::Schneider => self.schneider,
            StrokeKind::Kontermatsch => self.kontermatsch,
        }
    }

    fn bump(&mut self, kind: StrokeKind) {
        let slot = match kind {
            StrokeKind::Berg => &mut self.berg,
            StrokeKind::Sieg => &mut self.sieg,
            StrokeKind::Matsch => &mut self.matsch,
            StrokeKind::Schneider => &mut self.schneider,
            StrokeKind::Kontermatsch => &mut self.kontermatsch,
        };
        *slot = slot.saturating_add(1);
    }

    /// Total number of declarations, regardless of their stroke value.
    pub fn count(&self) -> u32 {
        self.berg + self.sieg + self.matsch + self.schneider + self.kontermatsch
    }

    /// Counter-wise sum, used when folding games into session totals.
    pub fn merged(&self, other: &StrokeRecord) -> StrokeRecord {
        StrokeRecord {
            berg: self.berg + other.berg,
            sieg: self.sieg + other.sieg,
            matsch: self.matsch + other.matsch,
            schneider: self.schneider + other.schneider,
            kontermatsch: self.kontermatsch + other.kontermatsch,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTally {
    pub strokes: u32,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStand {
    pub strokes: StrokeRecord,
    /// Sum of stroke values of all declarations.
    pub stroke_total: u32,
    pub jass_points: u32,
    pub weis_points: u32,
    /// Jass plus Weis points; never decreases within a game.
    pub total: u32,
    pub players: BTreeMap<PlayerNumber, PlayerTally>,
    pub berg_active: bool,
    pub bedanken_active: bool,
}

impl TeamStand {
    pub fn new(team: TeamPosition) -> Self {
        Self {
            strokes: StrokeRecord::default(),
            stroke_total: 0,
            jass_points: 0,
            weis_points: 0,
            total: 0,
            players: team
                .players()
                .into_iter()
                .map(|p| (p, PlayerTally::default()))
                .collect(),
            berg_active: false,
            bedanken_active: false,
        }
    }

    /// Fresh stands for both teams.
    pub fn pair() -> TeamPair<TeamStand> {
        TeamPair::new(
            TeamStand::new(TeamPosition::Top),
            TeamStand::new(TeamPosition::Bottom),
        )
    }

    pub fn add_jass_points(&mut self, points: u32, player: PlayerNumber) {
        self.jass_points = self.jass_points.saturating_add(points);
        self.credit_points(points, player);
    }

    pub fn add_weis_points(&mut self, points: u32, player: PlayerNumber) {
        self.weis_points = self.weis_points.saturating_add(points);
        self.credit_points(points, player);
    }

    fn credit_points(&mut self, points: u32, player: PlayerNumber) {
        self.total = self.total.saturating_add(points);
        if let Some(tally) = self.players.get_mut(&player) {
            tally.points = tally.points.saturating_add(points);
        }
    }

    fn record_stroke(&mut self, kind: StrokeKind, value: u32, player: PlayerNumber) {
        self.strokes.bump(kind);
        self.stroke_total = self.stroke_total.saturating_add(value);
        if let Some(tally) = self.players.get_mut(&player) {
            tally.strokes = tally.strokes.saturating_add(value);
        }
    }

    /// One-shot per game; returns whether the stroke was recorded.
    pub fn declare_berg(&mut self, player: PlayerNumber) -> bool {
        if self.berg_active {
            return false;
        }
        self.berg_active = true;
        self.record_stroke(StrokeKind::Berg, BERG_STROKES, player);
        true
    }

    /// Repeat calls while already active are no-ops.
    pub fn declare_bedanken(&mut self, player: PlayerNumber) -> bool {
        if self.bedanken_active {
            return false;
        }
        self.bedanken_active = true;
        self.record_stroke(StrokeKind::Sieg, BEDANKEN_STROKES, player);
        true
    }

    pub fn declare_matsch(&mut self, player: PlayerNumber) -> bool {
        self.record_stroke(StrokeKind::Matsch, MATSCH_STROKES, player);
        true
    }

    /// `value` comes from the stroke rules; a rule of 0 disables Kontermatsch.
    pub fn declare_kontermatsch(&mut self, value: u8, player: PlayerNumber) -> bool {
        if value == 0 {
            return false;
        }
        self.record_stroke(StrokeKind::Kontermatsch, u32::from(value), player);
        true
    }

    pub fn apply_schneider(&mut self, value: u8, player: PlayerNumber) -> bool {
        if value == 0 {
            return false;
        }
        self.record_stroke(StrokeKind::Schneider, u32::from(value), player);
        true
    }
}

/// Credit a scored round to both teams. Only the acting team's active player
/// receives the acting points; the opponent's points go to the team alone.
pub fn add_round(
    stands: &mut TeamPair<TeamStand>,
    acting: TeamPosition,
    score: RoundScore,
    player: PlayerNumber,
) {
    let (acting_stand, opponent_stand) = stands.split_mut(acting);
    acting_stand.add_jass_points(score.acting_score, player);
    opponent_stand.add_jass_points(score.opponent_score, player);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stand_seats_team_players() {
        let stand = TeamStand::new(TeamPosition::Bottom);
        assert_eq!(stand.players.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(stand.total, 0);
    }

    #[test]
    fn berg_is_one_shot() {
        let mut stand = TeamStand::new(TeamPosition::Top);
        assert!(stand.declare_berg(2));
        assert!(!stand.declare_berg(2));
        assert_eq!(stand.strokes.berg, 1);
        assert_eq!(stand.stroke_total, BERG_STROKES);
        assert_eq!(stand.players[&2].strokes, 1);
    }

    #[test]
    fn bedanken_twice_counts_once() {
        let mut stand = TeamStand::new(TeamPosition::Top);
        assert!(stand.declare_bedanken(4));
        assert!(!stand.declare_bedanken(4));
        assert_eq!(stand.strokes.sieg, 1);
        assert_eq!(stand.stroke_total, BEDANKEN_STROKES);
    }

    #[test]
    fn zero_rule_disables_kontermatsch_and_schneider() {
        let mut stand = TeamStand::new(TeamPosition::Top);
        assert!(!stand.declare_kontermatsch(0, 2));
        assert!(!stand.apply_schneider(0, 2));
        assert_eq!(stand.strokes, StrokeRecord::default());
        assert!(stand.declare_kontermatsch(2, 2));
        assert_eq!(stand.stroke_total, 2);
    }

    #[test]
    fn points_for_foreign_player_credit_team_only() {
        let mut stand = TeamStand::new(TeamPosition::Bottom);
        stand.add_jass_points(100, 2);
        assert_eq!(stand.total, 100);
        assert!(stand.players.values().all(|t| t.points == 0));
        stand.add_weis_points(50, 1);
        assert_eq!(stand.total, 150);
        assert_eq!(stand.players[&1].points, 50);
    }

    #[test]
    fn add_round_credits_both_teams() {
        let mut stands = TeamStand::pair();
        let score = RoundScore {
            acting_score: 240,
            opponent_score: 231,
        };
        add_round(&mut stands, TeamPosition::Bottom, score, 1);
        assert_eq!(stands.bottom.total, 240);
        assert_eq!(stands.top.total, 231);
        assert_eq!(stands.bottom.players[&1].points, 240);
    }
}
