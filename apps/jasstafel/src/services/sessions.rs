//! Session registry and the operations exposed to the HTTP layer.
//!
//! Each session lives behind its own mutex; every mutation runs to completion
//! under that lock, then the session's event outbox is drained and turned
//! into sync commands. The lock is never held across an `.await`.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::charge::{ChargeBoard, ChargeConfig};
use crate::domain::colors::JassColor;
use crate::domain::events::DomainEvent;
use crate::domain::game::{Declaration, DeclarationOutcome, RoundOutcome};
use crate::domain::history::Direction;
use crate::domain::records::{GameDocument, GameRecord};
use crate::domain::resumption::{ResumptionReport, ResumptionResolver};
use crate::domain::session::{SessionState, SessionStatus};
use crate::domain::settings::GameSettings;
use crate::domain::snapshot::SessionView;
use crate::domain::tally::{Denomination, TallyShape};
use crate::domain::team::TeamPosition;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::services::sync::{GameStore, SyncCommand, SyncDispatcher};

#[derive(Debug)]
struct SessionEntry {
    session: SessionState,
    charges: ChargeBoard,
}

/// Outcome of a resumption attempt for a returning participant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeOutcome {
    pub report: ResumptionReport,
    pub session: Option<SessionView>,
}

pub struct SessionService {
    sessions: DashMap<Uuid, Arc<Mutex<SessionEntry>>>,
    store: Arc<dyn GameStore>,
    sync: SyncDispatcher,
    charge: ChargeConfig,
    resolver: ResumptionResolver,
}

impl SessionService {
    /// Must be called inside a tokio runtime; the sync writer is spawned here.
    pub fn new(store: Arc<dyn GameStore>, charge: ChargeConfig, resolver: ResumptionResolver) -> Self {
        let (sync, _writer) = SyncDispatcher::spawn(store.clone());
        Self {
            sessions: DashMap::new(),
            store,
            sync,
            charge,
            resolver,
        }
    }

    pub fn charge_config(&self) -> ChargeConfig {
        self.charge
    }

    /// Number of sessions held by this process.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn entry(&self, session_id: Uuid) -> Result<Arc<Mutex<SessionEntry>>, DomainError> {
        self.sessions
            .get(&session_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Session,
                    format!("Session {session_id} not found"),
                )
            })
    }

    fn insert(&self, session: SessionState) -> SessionView {
        let mut entry = SessionEntry {
            session,
            charges: ChargeBoard::new(self.charge),
        };
        self.flush(&mut entry.session);
        let view = SessionView::of(&entry.session, Vec::new());
        self.sessions
            .insert(entry.session.id(), Arc::new(Mutex::new(entry)));
        view
    }

    /// Run `op` against one session under its lock, relay the resulting
    /// events, and return the op result with a fresh view. Charges never
    /// outlive the game they were pressed on.
    fn with_session<T>(
        &self,
        session_id: Uuid,
        op: impl FnOnce(&mut SessionEntry) -> Result<T, DomainError>,
    ) -> Result<(T, SessionView), DomainError> {
        let entry = self.entry(session_id)?;
        let mut guard = entry.lock();
        let before = guard.session.current().id();
        let result = op(&mut *guard);
        if guard.session.current().id() != before {
            let cancelled = guard.charges.cancel_all();
            if cancelled > 0 {
                debug!(%session_id, cancelled, "charges cancelled on game change");
            }
        }
        // Events from a partially applied op are still relayed.
        self.flush(&mut guard.session);
        let value = result?;
        let view = SessionView::of(&guard.session, guard.charges.active());
        Ok((value, view))
    }

    /// Drain the outbox and dispatch the matching sync commands.
    fn flush(&self, session: &mut SessionState) {
        let events = session.drain_events();
        if events.is_empty() {
            return;
        }
        let mut commands = Vec::new();
        let mut game_dirty = false;
        let mut session_dirty = false;
        for event in events {
            debug!(session_id = %session.id(), event = event.name(), "relaying domain event");
            match event {
                DomainEvent::GameStarted { .. } => {
                    game_dirty = true;
                    session_dirty = true;
                }
                DomainEvent::RoundCommitted { round, .. } => {
                    commands.push(SyncCommand::AppendRound(round));
                    game_dirty = true;
                }
                DomainEvent::DeclarationApplied { .. }
                | DomainEvent::WeisAdded { .. }
                | DomainEvent::HistoryNavigated { .. } => game_dirty = true,
                // The document came from storage; writing it back would echo.
                DomainEvent::GameReplaced { .. } => {}
                DomainEvent::GameCompleted { record, .. } => {
                    commands.push(SyncCommand::FinalizeGame(record));
                    session_dirty = true;
                }
                DomainEvent::SessionEnded { .. } => {
                    game_dirty = true;
                    session_dirty = true;
                }
            }
        }
        if game_dirty {
            commands.push(SyncCommand::UpsertGame(session.current_document()));
        }
        if session_dirty {
            commands.push(SyncCommand::UpsertSession(session.to_document()));
        }
        self.sync.dispatch_all(commands);
    }

    pub fn start_session(
        &self,
        participants: Vec<String>,
        settings: GameSettings,
        group_id: Option<String>,
    ) -> Result<SessionView, DomainError> {
        let session =
            SessionState::start(participants, settings, group_id, OffsetDateTime::now_utc())?;
        Ok(self.insert(session))
    }

    pub fn view(&self, session_id: Uuid) -> Result<SessionView, DomainError> {
        let entry = self.entry(session_id)?;
        let guard = entry.lock();
        Ok(SessionView::of(&guard.session, guard.charges.active()))
    }

    pub fn submit_round(
        &self,
        session_id: Uuid,
        acting: TeamPosition,
        color: JassColor,
        raw_score: i32,
    ) -> Result<(RoundOutcome, SessionView), DomainError> {
        let now = OffsetDateTime::now_utc();
        self.with_session(session_id, |entry| {
            entry.session.submit_round(acting, color, raw_score, now)
        })
    }

    pub fn declare(
        &self,
        session_id: Uuid,
        declaration: Declaration,
        team: TeamPosition,
    ) -> Result<(DeclarationOutcome, SessionView), DomainError> {
        let now = OffsetDateTime::now_utc();
        self.with_session(session_id, |entry| {
            entry.session.declare(declaration, team, now)
        })
    }

    pub fn add_weis(
        &self,
        session_id: Uuid,
        team: TeamPosition,
        points: u32,
    ) -> Result<(Option<TeamPosition>, SessionView), DomainError> {
        let now = OffsetDateTime::now_utc();
        self.with_session(session_id, |entry| entry.session.add_weis(team, points, now))
    }

    /// Moving the cursor under a running charge would apply it to another
    /// entry than the one it was pressed on, so that is refused.
    pub fn navigate(
        &self,
        session_id: Uuid,
        direction: Direction,
    ) -> Result<(bool, SessionView), DomainError> {
        self.with_session(session_id, |entry| {
            if let Some(charge) = entry.charges.active().first() {
                return Err(DomainError::conflict(
                    ConflictKind::ChargeActive,
                    format!(
                        "Release the {} charge for {} before moving through history",
                        charge.action,
                        charge.team.as_str()
                    ),
                ));
            }
            entry.session.navigate(direction)
        })
    }

    /// Tally shapes for one team, all denominations unless one is given.
    pub fn tally(
        &self,
        session_id: Uuid,
        team: TeamPosition,
        denomination: Option<Denomination>,
    ) -> Result<Vec<TallyShape>, DomainError> {
        let entry = self.entry(session_id)?;
        let guard = entry.lock();
        let game = guard.session.current();
        let shapes = match denomination {
            Some(d) => vec![game.tally(team, d)],
            None => Denomination::ALL
                .into_iter()
                .map(|d| game.tally(team, d))
                .collect(),
        };
        Ok(shapes)
    }

    /// Start charging; returns whether a new charge began. Pressing an
    /// action whose precondition does not hold, or one already charging,
    /// changes nothing.
    pub fn press_charge(
        &self,
        session_id: Uuid,
        action: Declaration,
        team: TeamPosition,
    ) -> Result<(bool, SessionView), DomainError> {
        self.with_session(session_id, |entry| {
            if entry.session.status() != SessionStatus::Active {
                return Err(DomainError::conflict(
                    ConflictKind::SessionClosed,
                    format!("Session {} has ended", entry.session.id()),
                ));
            }
            let allowed = entry.session.current().can_declare(action, team);
            let started = entry.charges.press(action, team, allowed);
            if !started {
                debug!(%action, team = team.as_str(), allowed, "charge press ignored");
            }
            Ok(started)
        })
    }

    /// Advance a running charge by one tick. `None` once it is no longer
    /// charging or the session is gone.
    pub fn tick_charge(&self, session_id: Uuid, action: Declaration, team: TeamPosition) -> Option<f32> {
        let entry = self.sessions.get(&session_id).map(|e| Arc::clone(e.value()))?;
        let mut guard = entry.lock();
        guard.charges.tick(action, team)
    }

    /// Resolve a charge, applying its declaration exactly once. `None` when
    /// nothing was charging.
    pub fn release_charge(
        &self,
        session_id: Uuid,
        action: Declaration,
        team: TeamPosition,
    ) -> Result<(Option<DeclarationOutcome>, SessionView), DomainError> {
        let now = OffsetDateTime::now_utc();
        self.with_session(session_id, |entry| {
            let SessionEntry { session, charges } = entry;
            charges
                .release(action, team, |a, t| session.declare(a, t, now))
                .transpose()
        })
    }

    pub fn end_session(&self, session_id: Uuid) -> Result<SessionView, DomainError> {
        let (cancelled, view) = self.with_session(session_id, |entry| {
            entry.session.end()?;
            Ok(entry.charges.cancel_all())
        })?;
        if cancelled > 0 {
            debug!(%session_id, cancelled, "charges cancelled at session end");
        }
        Ok(view)
    }

    /// Replace the open game of a session with a stored one. A session this
    /// process does not hold is restored from storage first.
    pub async fn resume_game(&self, session_id: Uuid, game_id: Uuid) -> Result<SessionView, DomainError> {
        let game_key = game_id.to_string();
        let doc = self.store.load_game(&game_key).await?.ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Game, format!("Game {game_id} not found"))
        })?;
        if doc.record.session_id != session_id.to_string() {
            return Err(DomainError::validation(
                ValidationKind::InvalidRecord,
                format!("Game {game_id} does not belong to session {session_id}"),
            ));
        }

        if self.sessions.contains_key(&session_id) {
            let (_, view) = self.with_session(session_id, |entry| {
                entry.charges.cancel_all();
                entry.session.replace_game(doc)
            })?;
            info!(%session_id, %game_id, "game resumed");
            return Ok(view);
        }

        let session_doc = self
            .store
            .load_session(&session_id.to_string())
            .await?
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Session,
                    format!("Session {session_id} not found"),
                )
            })?;
        let session = SessionState::restore(session_doc, doc)?;
        match self.sessions.entry(session_id) {
            // Another resume restored it while storage was being read.
            Entry::Occupied(slot) => {
                debug!(%session_id, "session restored concurrently; keeping the first");
                let existing = Arc::clone(slot.get());
                drop(slot);
                let guard = existing.lock();
                Ok(SessionView::of(&guard.session, guard.charges.active()))
            }
            Entry::Vacant(slot) => {
                let mut entry = SessionEntry {
                    session,
                    charges: ChargeBoard::new(self.charge),
                };
                self.flush(&mut entry.session);
                let view = SessionView::of(&entry.session, Vec::new());
                slot.insert(Arc::new(Mutex::new(entry)));
                info!(%session_id, %game_id, "game resumed on a fresh device");
                Ok(view)
            }
        }
    }

    /// Pick the game a returning participant should continue, restoring it
    /// when one qualifies. Empty games past the grace period are marked
    /// abandoned.
    pub async fn resume_for(
        &self,
        participant_id: &str,
        now: OffsetDateTime,
    ) -> Result<ResumeOutcome, DomainError> {
        let candidates = self.store.active_games_for(participant_id).await?;
        let report = self.on_candidates_changed(&candidates, now);

        let Some(selected) = report.selected.clone() else {
            debug!(participant_id, "nothing to resume");
            return Ok(ResumeOutcome { report, session: None });
        };
        let Some(record) = candidates.iter().find(|c| c.id == selected) else {
            return Ok(ResumeOutcome { report, session: None });
        };
        let ids = (
            Uuid::parse_str(&record.session_id),
            Uuid::parse_str(&record.id),
        );
        let (Ok(session_id), Ok(game_id)) = ids else {
            warn!(game_id = %record.id, "selected candidate carries unparsable ids");
            return Ok(ResumeOutcome { report, session: None });
        };

        let session = self.resume_game(session_id, game_id).await?;
        Ok(ResumeOutcome {
            report,
            session: Some(session),
        })
    }

    /// Re-run selection over an updated candidate set. Safe to call on every
    /// update; the same set at the same time always yields the same report.
    pub fn on_candidates_changed(&self, candidates: &[GameRecord], now: OffsetDateTime) -> ResumptionReport {
        let report = self.resolver.resolve(candidates, now);
        for id in &report.empty {
            info!(game_id = %id, "marking empty game abandoned");
        }
        self.sync.dispatch_all(
            report
                .empty
                .iter()
                .cloned()
                .map(SyncCommand::MarkAbandoned),
        );
        report
    }

    /// Resolve over raw candidates as delivered by a remote subscription.
    /// Entries that do not parse as game records count as malformed.
    pub fn resolve_raw_candidates(
        &self,
        raw: Vec<serde_json::Value>,
        now: OffsetDateTime,
    ) -> ResumptionReport {
        let mut unparsable = Vec::new();
        let mut records = Vec::new();
        for (index, value) in raw.into_iter().enumerate() {
            let label = value
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| format!("#{index}"), str::to_string);
            match serde_json::from_value::<GameRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(candidate = %label, error = %e, "unparsable resumption candidate");
                    unparsable.push(label);
                }
            }
        }
        let mut report = self.on_candidates_changed(&records, now);
        report.malformed.extend(unparsable);
        report.malformed.sort();
        report
    }

    /// Apply a document pushed from storage. The open game is replaced
    /// wholesale; the latest writer wins.
    pub fn apply_remote_game(&self, doc: GameDocument) -> Result<SessionView, DomainError> {
        let session_id = Uuid::parse_str(&doc.record.session_id).map_err(|_| {
            DomainError::validation(
                ValidationKind::InvalidRecord,
                format!("session id '{}' is not a valid id", doc.record.session_id),
            )
        })?;
        let game_id = doc.record.id.clone();
        let (_, view) = self.with_session(session_id, |entry| {
            entry.charges.cancel_all();
            entry.session.replace_game(doc)
        })?;
        debug!(%session_id, %game_id, "remote game applied");
        Ok(view)
    }
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("sessions", &self.sessions.len())
            .field("charge", &self.charge)
            .field("resolver", &self.resolver)
            .finish()
    }
}
