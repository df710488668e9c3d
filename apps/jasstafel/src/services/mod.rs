pub mod charge_ticker;
pub mod sessions;
pub mod sync;

pub use charge_ticker::ChargeTicker;
pub use sessions::{ResumeOutcome, SessionService};
pub use sync::{GameStore, InMemoryGameStore, SyncCommand, SyncDispatcher};
