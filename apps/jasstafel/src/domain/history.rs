//! Linear undo/redo log of immutable game snapshots.
//!
//! The log always holds at least one entry (the start state) and a cursor in
//! `0..len`. Committing while the cursor is behind the tip discards every
//! entry after the cursor before appending.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::colors::JassColor;
use crate::domain::team::{TeamPair, TeamPosition};
use crate::domain::team_stand::{StrokeRecord, TeamStand};
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Backward,
    Forward,
    /// Straight to the newest entry.
    Latest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog<T> {
    entries: Vec<T>,
    cursor: usize,
}

impl<T> HistoryLog<T> {
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Rebuild a log from stored parts, rejecting an empty log or a cursor
    /// outside the entries.
    pub fn from_parts(entries: Vec<T>, cursor: usize) -> Result<Self, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InvalidRecord,
                "History must contain at least the start entry",
            ));
        }
        if cursor >= entries.len() {
            return Err(DomainError::validation(
                ValidationKind::InvalidRecord,
                format!(
                    "History cursor {cursor} is outside 0..{}",
                    entries.len()
                ),
            ));
        }
        Ok(Self { entries, cursor })
    }

    /// Append after the cursor, dropping any redo branch.
    pub fn commit(&mut self, entry: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    /// Replace the entry at the cursor, dropping any redo branch.
    pub fn amend(&mut self, entry: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries[self.cursor] = entry;
    }

    /// Move the cursor, clamped to the log; returns the entry at the new cursor.
    pub fn navigate(&mut self, direction: Direction) -> &T {
        match direction {
            Direction::Backward => self.cursor = self.cursor.saturating_sub(1),
            Direction::Forward => {
                if self.cursor + 1 < self.entries.len() {
                    self.cursor += 1;
                }
            }
            Direction::Latest => self.cursor = self.entries.len() - 1,
        }
        &self.entries[self.cursor]
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a constructed log; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn into_parts(self) -> (Vec<T>, usize) {
        (self.entries, self.cursor)
    }
}

/// What produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Start,
    #[serde(rename_all = "camelCase")]
    Round {
        acting: TeamPosition,
        raw_score: i32,
    },
}

/// Immutable snapshot of both teams after a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub kind: EntryKind,
    pub stands: TeamPair<TeamStand>,
    pub color_played: Option<JassColor>,
    pub multiplier_applied: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl HistoryEntry {
    pub fn start(timestamp: OffsetDateTime) -> Self {
        Self {
            kind: EntryKind::Start,
            stands: TeamStand::pair(),
            color_played: None,
            multiplier_applied: 0,
            timestamp,
        }
    }

    /// Team that acted in the round this entry records, if any.
    pub fn actor(&self) -> Option<TeamPosition> {
        match self.kind {
            EntryKind::Start => None,
            EntryKind::Round { acting, .. } => Some(acting),
        }
    }

    pub fn top_score(&self) -> u32 {
        self.stands.top.total
    }

    pub fn bottom_score(&self) -> u32 {
        self.stands.bottom.total
    }

    pub fn top_strokes(&self) -> StrokeRecord {
        self.stands.top.strokes
    }

    pub fn bottom_strokes(&self) -> StrokeRecord {
        self.stands.bottom.strokes
    }
}
