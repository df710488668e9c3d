//! Relay of local changes to the remote document store.
//!
//! Local state is authoritative the moment a mutation succeeds. Commands are
//! queued on an unbounded channel and written by one background task; a
//! failed write is logged and dropped, never retried. Inbound documents come
//! back through `SessionService::apply_remote_game`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::domain::records::{GameDocument, GameRecord, GameStatus, RoundRecord, SessionDocument};
use crate::errors::domain::{DomainError, InfraErrorKind};

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn upsert_game(&self, doc: GameDocument) -> Result<(), DomainError>;
    async fn finalize_game(&self, record: GameRecord) -> Result<(), DomainError>;
    async fn append_round(&self, round: RoundRecord) -> Result<(), DomainError>;
    async fn upsert_session(&self, doc: SessionDocument) -> Result<(), DomainError>;
    /// Active game records listing `participant_id` among their players.
    async fn active_games_for(&self, participant_id: &str) -> Result<Vec<GameRecord>, DomainError>;
    async fn load_game(&self, game_id: &str) -> Result<Option<GameDocument>, DomainError>;
    async fn load_session(&self, session_id: &str) -> Result<Option<SessionDocument>, DomainError>;
    async fn mark_abandoned(&self, game_id: &str) -> Result<(), DomainError>;
}

/// Process-local store, used by default and in tests.
#[derive(Debug)]
pub struct InMemoryGameStore {
    games: DashMap<String, GameDocument>,
    rounds: DashMap<String, Vec<RoundRecord>>,
    sessions: DashMap<String, SessionDocument>,
    available: AtomicBool,
}

impl Default for InMemoryGameStore {
    fn default() -> Self {
        Self {
            games: DashMap::new(),
            rounds: DashMap::new(),
            sessions: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with `SyncUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::infra(
                InfraErrorKind::SyncUnavailable,
                "document store is unreachable",
            ))
        }
    }

    pub fn game(&self, game_id: &str) -> Option<GameDocument> {
        self.games.get(game_id).map(|g| g.value().clone())
    }

    pub fn session(&self, session_id: &str) -> Option<SessionDocument> {
        self.sessions.get(session_id).map(|s| s.value().clone())
    }

    pub fn rounds_for(&self, game_id: &str) -> Vec<RoundRecord> {
        self.rounds
            .get(game_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Store a document as if another device had written it.
    pub fn insert_game(&self, doc: GameDocument) {
        self.games.insert(doc.record.id.clone(), doc);
    }
}

#[async_trait]
impl GameStore for InMemoryGameStore {
    async fn upsert_game(&self, doc: GameDocument) -> Result<(), DomainError> {
        self.check()?;
        // A finalized game is never reopened by a late upsert.
        if let Some(existing) = self.games.get(&doc.record.id) {
            if existing.record.status == GameStatus::Completed {
                return Ok(());
            }
        }
        self.games.insert(doc.record.id.clone(), doc);
        Ok(())
    }

    async fn finalize_game(&self, record: GameRecord) -> Result<(), DomainError> {
        self.check()?;
        match self.games.get_mut(&record.id) {
            Some(mut doc) => doc.record = record,
            None => warn!(game_id = %record.id, "finalizing a game that was never stored"),
        }
        Ok(())
    }

    async fn append_round(&self, round: RoundRecord) -> Result<(), DomainError> {
        self.check()?;
        self.rounds
            .entry(round.game_id.clone())
            .or_default()
            .push(round);
        Ok(())
    }

    async fn upsert_session(&self, doc: SessionDocument) -> Result<(), DomainError> {
        self.check()?;
        self.sessions.insert(doc.id.clone(), doc);
        Ok(())
    }

    async fn active_games_for(&self, participant_id: &str) -> Result<Vec<GameRecord>, DomainError> {
        self.check()?;
        let mut records: Vec<GameRecord> = self
            .games
            .iter()
            .filter(|g| g.record.status == GameStatus::Active)
            .filter(|g| g.record.participant_ids.iter().any(|p| p == participant_id))
            .map(|g| g.record.clone())
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn load_game(&self, game_id: &str) -> Result<Option<GameDocument>, DomainError> {
        self.check()?;
        Ok(self.game(game_id))
    }

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionDocument>, DomainError> {
        self.check()?;
        Ok(self.session(session_id))
    }

    async fn mark_abandoned(&self, game_id: &str) -> Result<(), DomainError> {
        self.check()?;
        if let Some(mut doc) = self.games.get_mut(game_id) {
            if doc.record.status == GameStatus::Active {
                doc.record.status = GameStatus::Aborted;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncCommand {
    UpsertGame(GameDocument),
    FinalizeGame(GameRecord),
    AppendRound(RoundRecord),
    UpsertSession(SessionDocument),
    MarkAbandoned(String),
}

impl SyncCommand {
    fn name(&self) -> &'static str {
        match self {
            SyncCommand::UpsertGame(_) => "upsert_game",
            SyncCommand::FinalizeGame(_) => "finalize_game",
            SyncCommand::AppendRound(_) => "append_round",
            SyncCommand::UpsertSession(_) => "upsert_session",
            SyncCommand::MarkAbandoned(_) => "mark_abandoned",
        }
    }
}

async fn apply_command(store: &dyn GameStore, command: SyncCommand) -> Result<(), DomainError> {
    match command {
        SyncCommand::UpsertGame(doc) => store.upsert_game(doc).await,
        SyncCommand::FinalizeGame(record) => store.finalize_game(record).await,
        SyncCommand::AppendRound(round) => store.append_round(round).await,
        SyncCommand::UpsertSession(doc) => store.upsert_session(doc).await,
        SyncCommand::MarkAbandoned(id) => store.mark_abandoned(&id).await,
    }
}

/// Handle for queueing writes; cheap to clone.
#[derive(Debug, Clone)]
pub struct SyncDispatcher {
    tx: mpsc::UnboundedSender<SyncCommand>,
}

impl SyncDispatcher {
    /// Start the writer task. It runs until every dispatcher handle is dropped.
    pub fn spawn(store: Arc<dyn GameStore>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<SyncCommand>();
        let handle = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                let name = command.name();
                match apply_command(store.as_ref(), command).await {
                    Ok(()) => debug!(command = name, "sync write applied"),
                    Err(e) => warn!(command = name, error = %e, "sync write failed; local state stays authoritative"),
                }
            }
            debug!("sync writer stopped");
        });
        (Self { tx }, handle)
    }

    pub fn dispatch(&self, command: SyncCommand) {
        let name = command.name();
        if self.tx.send(command).is_err() {
            error!(command = name, "sync writer is gone; dropping command");
        }
    }

    pub fn dispatch_all(&self, commands: impl IntoIterator<Item = SyncCommand>) {
        for command in commands {
            self.dispatch(command);
        }
    }
}
