//! Read-only view models handed to the view layer.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::charge::ActiveCharge;
use crate::domain::colors::JassColor;
use crate::domain::game::GameState;
use crate::domain::session::{GameSummary, SessionState, SessionStatus, SessionTotals};
use crate::domain::tally::{Denomination, PointBreakdown, TallyShape};
use crate::domain::team::{PlayerNumber, TeamPair, TeamPosition};
use crate::domain::team_stand::TeamStand;

/// Which milestones a team has reached in the open game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFlags {
    pub berg_reached: bool,
    pub berg_declared: bool,
    pub sieg_reached: bool,
    pub bedankt: bool,
    pub schneider: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub stand: TeamStand,
    pub remaining_to_sieg: u32,
    pub remaining_to_berg: Option<u32>,
    pub steps: StepFlags,
    pub breakdown: PointBreakdown,
    pub tallies: Vec<TallyShape>,
}

impl TeamView {
    pub fn of(game: &GameState, team: TeamPosition) -> Self {
        let stand = game.stand(team).clone();
        let targets = game.settings().score_targets;
        let steps = StepFlags {
            berg_reached: game.settings().enabled.berg && stand.total >= targets.berg,
            berg_declared: stand.berg_active,
            sieg_reached: stand.total >= targets.sieg,
            bedankt: stand.bedanken_active,
            schneider: stand.strokes.schneider > 0,
        };
        Self {
            remaining_to_sieg: game.remaining_to_sieg(team),
            remaining_to_berg: game.remaining_to_berg(team),
            steps,
            breakdown: game.breakdown(team),
            tallies: Denomination::ALL
                .into_iter()
                .map(|d| game.tally(team, d))
                .collect(),
            stand,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: Uuid,
    pub sequence: u32,
    pub round: u32,
    pub active_player: PlayerNumber,
    pub completed: bool,
    pub winner: Option<TeamPosition>,
    pub last_color: Option<JassColor>,
    pub cursor: usize,
    pub history_len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub teams: TeamPair<TeamView>,
}

impl GameView {
    pub fn of(game: &GameState) -> Self {
        let history = game.history();
        Self {
            id: game.id(),
            sequence: game.sequence(),
            round: game.round(),
            active_player: game.active_player(),
            completed: game.is_completed(),
            winner: game.winner(),
            last_color: game.last_color(),
            cursor: history.cursor(),
            history_len: history.len(),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
            teams: TeamPair::new(
                TeamView::of(game, TeamPosition::Top),
                TeamView::of(game, TeamPosition::Bottom),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub group_id: Option<String>,
    pub participants: Vec<String>,
    pub status: SessionStatus,
    pub totals: SessionTotals,
    pub games: Vec<GameSummary>,
    pub current: GameView,
    pub charges: Vec<ActiveCharge>,
}

impl SessionView {
    pub fn of(session: &SessionState, charges: Vec<ActiveCharge>) -> Self {
        Self {
            id: session.id(),
            group_id: session.group_id().map(str::to_string),
            participants: session.participants().to_vec(),
            status: session.status(),
            totals: session.totals().clone(),
            games: session.games().to_vec(),
            current: GameView::of(session.current()),
            charges,
        }
    }
}
