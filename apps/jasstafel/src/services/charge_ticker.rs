//! Drives held charges forward on a fixed tick.
//!
//! At most one task runs per (session, action, team). A task ends when its
//! token is cancelled (release, session teardown, drop of the ticker) or when
//! the board reports the charge is no longer running.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::domain::charge::ActiveCharge;
use crate::domain::game::Declaration;
use crate::domain::team::TeamPosition;
use crate::services::sessions::SessionService;

pub type ChargeKey = (Uuid, Declaration, TeamPosition);

#[derive(Debug)]
pub struct ChargeTicker {
    sessions: Arc<SessionService>,
    period: Duration,
    tasks: Arc<DashMap<ChargeKey, (u64, CancellationToken)>>,
    generation: AtomicU64,
}

impl ChargeTicker {
    pub fn new(sessions: Arc<SessionService>) -> Self {
        let period = sessions.charge_config().tick;
        Self {
            sessions,
            period,
            tasks: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Spawn the tick task for a charge. Returns false if one is already
    /// running for the same key.
    pub fn start(&self, session_id: Uuid, action: Declaration, team: TeamPosition) -> bool {
        let key = (session_id, action, team);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        match self.tasks.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => return false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert((generation, token.clone()));
            }
        }

        let sessions = Arc::clone(&self.sessions);
        let tasks = Arc::clone(&self.tasks);
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        trace!(%session_id, %action, "charge tick cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        if sessions.tick_charge(session_id, action, team).is_none() {
                            debug!(%session_id, %action, "charge no longer running; ticker exits");
                            break;
                        }
                    }
                }
            }
            tasks.remove_if(&key, |_, (owner, _)| *owner == generation);
        });
        true
    }

    pub fn stop(&self, session_id: Uuid, action: Declaration, team: TeamPosition) -> bool {
        match self.tasks.remove(&(session_id, action, team)) {
            Some((_, (_, token))) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every tick task of one session.
    pub fn stop_session(&self, session_id: Uuid) -> usize {
        let keys: Vec<ChargeKey> = self
            .tasks
            .iter()
            .filter(|t| t.key().0 == session_id)
            .map(|t| *t.key())
            .collect();
        keys.into_iter()
            .filter(|(s, a, t)| self.stop(*s, *a, *t))
            .count()
    }

    /// Cancel the tasks of one session whose charge is not in `active`.
    pub fn retain(&self, session_id: Uuid, active: &[ActiveCharge]) -> usize {
        let stale: Vec<ChargeKey> = self
            .tasks
            .iter()
            .map(|t| *t.key())
            .filter(|(s, a, t)| {
                *s == session_id && !active.iter().any(|c| c.action == *a && c.team == *t)
            })
            .collect();
        stale
            .into_iter()
            .filter(|(s, a, t)| self.stop(*s, *a, *t))
            .count()
    }

    pub fn running(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_running(&self, session_id: Uuid, action: Declaration, team: TeamPosition) -> bool {
        self.tasks.contains_key(&(session_id, action, team))
    }
}

impl Drop for ChargeTicker {
    fn drop(&mut self) {
        for task in self.tasks.iter() {
            task.value().1.cancel();
        }
        self.tasks.clear();
    }
}
