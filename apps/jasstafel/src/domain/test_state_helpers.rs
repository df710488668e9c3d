// Helpers for building game and session fixtures in domain tests.

use time::macros::datetime;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::colors::JassColor;
use crate::domain::game::GameState;
use crate::domain::session::SessionState;
use crate::domain::settings::{ColorMultipliers, GameSettings};
use crate::domain::team::TeamPosition;

pub const T0: OffsetDateTime = datetime!(2024-03-01 18:00 UTC);

pub fn players() -> Vec<String> {
    ["anna", "beat", "chris", "dora"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Settings where every color counts once, so arithmetic in tests stays obvious.
pub fn flat_settings() -> GameSettings {
    let multipliers = JassColor::ALL
        .into_iter()
        .fold(ColorMultipliers::default(), |m, c| m.with(c, 1));
    GameSettings {
        color_multipliers: multipliers,
        ..GameSettings::default()
    }
}

pub fn new_game(settings: GameSettings) -> GameState {
    GameState::new(Uuid::new_v4(), 1, settings, T0)
}

pub fn new_session(settings: GameSettings) -> SessionState {
    SessionState::start(players(), settings, None, T0).unwrap()
}

/// Submit one round per raw score, all in Rosen.
pub fn play(game: &mut GameState, acting: TeamPosition, raw_scores: &[i32]) {
    for raw in raw_scores {
        game.submit_round(acting, JassColor::Rosen, *raw, T0).unwrap();
    }
}
