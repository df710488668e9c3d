//! Choosing which in-progress game a returning device should reload.
//!
//! Candidates are scored by how much play they contain. Games with no
//! content are treated as abandoned once they are older than the grace
//! period; younger ones are merely exempt from that exclusion, they gain no
//! advantage in the ranking. Selection is a pure function of the candidate
//! set and `now`, so re-running it on every update converges.

use std::cmp::Reverse;

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::domain::records::{GameRecord, GameStatus};
use crate::domain::team::PLAYERS;

/// Age below which an empty game is still considered freshly started.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::minutes(2);

const ROUND_WEIGHT: i64 = 100;
const STROKE_WEIGHT: i64 = 50;

/// Round counters above this cannot come from real play.
pub const MAX_ROUND: i64 = 10_000;

/// Amount of play recorded in a game. A game still in its first round with
/// no points and no strokes scores 0. `None` when the counters overflow.
pub fn content_score(record: &GameRecord) -> Option<i64> {
    let rounds_played = (record.current_round.checked_sub(1)?).max(0);
    let points = record.scores.top.checked_add(record.scores.bottom)?;
    let strokes = record
        .strokes
        .top
        .total()?
        .checked_add(record.strokes.bottom.total()?)?;
    rounds_played
        .checked_mul(ROUND_WEIGHT)?
        .checked_add(points)?
        .checked_add(strokes.checked_mul(STROKE_WEIGHT)?)
}

/// Why a record cannot take part in selection, if it cannot.
fn malformation(record: &GameRecord) -> Option<&'static str> {
    if record.id.trim().is_empty() {
        return Some("missing id");
    }
    if record.created_at.is_none() {
        return Some("missing createdAt");
    }
    if record.current_round < 1 {
        return Some("round counter below 1");
    }
    if record.current_round > MAX_ROUND {
        return Some("round counter out of range");
    }
    if record.scores.top < 0 || record.scores.bottom < 0 {
        return Some("negative score");
    }
    if record.strokes.top.has_negative() || record.strokes.bottom.has_negative() {
        return Some("negative stroke counter");
    }
    if record.participant_ids.len() != PLAYERS {
        return Some("participant count");
    }
    if content_score(record).is_none() {
        return Some("counter overflow");
    }
    None
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumptionReport {
    pub selected: Option<String>,
    /// Empty games past the grace period; callers may mark them abandoned.
    pub empty: Vec<String>,
    pub malformed: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumptionResolver {
    grace: Duration,
}

impl Default for ResumptionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

impl ResumptionResolver {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn select(&self, candidates: &[GameRecord], now: OffsetDateTime) -> Option<String> {
        self.resolve(candidates, now).selected
    }

    pub fn resolve(&self, candidates: &[GameRecord], now: OffsetDateTime) -> ResumptionReport {
        let mut report = ResumptionReport::default();
        let mut eligible: Vec<(i64, OffsetDateTime, &str)> = Vec::new();

        for record in candidates {
            if record.status != GameStatus::Active {
                debug!(game_id = %record.id, status = ?record.status, "skipping inactive candidate");
                continue;
            }
            if let Some(reason) = malformation(record) {
                warn!(game_id = %record.id, reason, "excluding malformed resumption candidate");
                report.malformed.push(record.id.clone());
                continue;
            }
            let (Some(created_at), Some(score)) = (record.created_at, content_score(record)) else {
                continue;
            };
            // Clock skew can put created_at in the future; treat that as age 0.
            let age = (now - created_at).max(Duration::ZERO);

            if score == 0 && age >= self.grace {
                report.empty.push(record.id.clone());
                continue;
            }
            eligible.push((score, created_at, record.id.as_str()));
        }

        eligible.sort_by_key(|(score, created_at, id)| (Reverse(*score), Reverse(*created_at), *id));
        report.selected = eligible.first().map(|(_, _, id)| id.to_string());
        report.empty.sort();
        report.malformed.sort();
        report
    }
}
