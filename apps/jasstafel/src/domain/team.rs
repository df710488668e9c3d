//! Team positions, player numbering and rotation helpers.
//!
//! Players are numbered 1..=4 around the table. Players 1 and 3 sit on the
//! `bottom` team, players 2 and 4 on the `top` team. Every layer shares these
//! helpers as the single source of truth for "who acts next".

use serde::{Deserialize, Serialize};

pub const PLAYERS: usize = 4;

/// 1-based player number (1..=4).
pub type PlayerNumber = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamPosition {
    Top,
    Bottom,
}

impl TeamPosition {
    pub const ALL: [TeamPosition; 2] = [TeamPosition::Top, TeamPosition::Bottom];

    pub fn opponent(self) -> TeamPosition {
        match self {
            TeamPosition::Top => TeamPosition::Bottom,
            TeamPosition::Bottom => TeamPosition::Top,
        }
    }

    /// Both player numbers seated on this team.
    pub fn players(self) -> [PlayerNumber; 2] {
        match self {
            TeamPosition::Top => [2, 4],
            TeamPosition::Bottom => [1, 3],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamPosition::Top => "top",
            TeamPosition::Bottom => "bottom",
        }
    }
}

impl std::str::FromStr for TeamPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(TeamPosition::Top),
            "bottom" => Ok(TeamPosition::Bottom),
            other => Err(format!("unknown team '{other}'")),
        }
    }
}

/// Team a player number belongs to.
#[inline]
pub fn team_for_player(player: PlayerNumber) -> TeamPosition {
    if player % 2 == 0 {
        TeamPosition::Top
    } else {
        TeamPosition::Bottom
    }
}

/// Returns the next player clockwise (1 → 2 → 3 → 4 → 1).
#[inline]
pub fn next_player(player: PlayerNumber) -> PlayerNumber {
    (player % PLAYERS as u8) + 1
}

/// Active player after `index` committed history entries.
#[inline]
pub fn player_for_index(index: usize) -> PlayerNumber {
    (index % PLAYERS) as PlayerNumber + 1
}

/// A value held once per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPair<T> {
    pub top: T,
    pub bottom: T,
}

impl<T> TeamPair<T> {
    pub fn new(top: T, bottom: T) -> Self {
        Self { top, bottom }
    }

    pub fn get(&self, team: TeamPosition) -> &T {
        match team {
            TeamPosition::Top => &self.top,
            TeamPosition::Bottom => &self.bottom,
        }
    }

    pub fn get_mut(&mut self, team: TeamPosition) -> &mut T {
        match team {
            TeamPosition::Top => &mut self.top,
            TeamPosition::Bottom => &mut self.bottom,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(TeamPosition, &T) -> U) -> TeamPair<U> {
        TeamPair {
            top: f(TeamPosition::Top, &self.top),
            bottom: f(TeamPosition::Bottom, &self.bottom),
        }
    }

    /// Mutable access to (acting, opponent) in that order.
    pub fn split_mut(&mut self, acting: TeamPosition) -> (&mut T, &mut T) {
        match acting {
            TeamPosition::Top => (&mut self.top, &mut self.bottom),
            TeamPosition::Bottom => (&mut self.bottom, &mut self.top),
        }
    }
}

impl<T: Clone> TeamPair<T> {
    pub fn splat(value: T) -> Self {
        Self {
            top: value.clone(),
            bottom: value,
        }
    }
}
