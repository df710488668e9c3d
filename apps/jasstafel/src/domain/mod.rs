//! Domain layer: pure scoring and session logic, no I/O.

pub mod charge;
pub mod colors;
pub mod events;
pub mod game;
pub mod history;
pub mod records;
pub mod resumption;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod tally;
pub mod team;
pub mod team_stand;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod test_state_helpers;
#[cfg(test)]
mod tests_game;
#[cfg(test)]
mod tests_props;
#[cfg(test)]
mod tests_session;

// Re-exports for ergonomics
pub use colors::JassColor;
pub use game::{Declaration, DeclarationOutcome, GameState, RoundOutcome};
pub use history::{Direction, HistoryEntry, HistoryLog};
pub use resumption::{ResumptionReport, ResumptionResolver};
pub use session::SessionState;
pub use settings::GameSettings;
pub use tally::{Denomination, TallyShape};
pub use team::{TeamPair, TeamPosition};
pub use team_stand::TeamStand;
