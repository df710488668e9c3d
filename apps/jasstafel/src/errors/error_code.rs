//! Error codes for the Jasstafel backend API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};

/// Centralized error codes for the Jasstafel backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Unknown or disabled Jass color
    InvalidColor,
    /// Raw round score outside [0, 157] and not the Matsch sentinel
    ScoreOutOfRange,
    /// Color multiplier outside 1..=8
    InvalidMultiplier,
    /// Fewer than four participants selected
    NotEnoughPlayers,
    /// The same participant was selected twice
    DuplicatePlayer,
    /// Settings failed validation
    InvalidSettings,
    /// Weis points outside the accepted range
    InvalidWeis,
    /// A stored record could not be interpreted
    InvalidRecord,
    /// Invalid session or game ID provided
    InvalidId,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// Session not found
    SessionNotFound,
    /// Game not found
    GameNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Game is already completed
    GameCompleted,
    /// Session was ended
    SessionClosed,
    /// A charge for this action and team is already running
    ChargeActive,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Remote storage is unavailable
    SyncUnavailable,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    ///
    /// This is the exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Request Validation
            Self::InvalidColor => "INVALID_COLOR",
            Self::ScoreOutOfRange => "SCORE_OUT_OF_RANGE",
            Self::InvalidMultiplier => "INVALID_MULTIPLIER",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::DuplicatePlayer => "DUPLICATE_PLAYER",
            Self::InvalidSettings => "INVALID_SETTINGS",
            Self::InvalidWeis => "INVALID_WEIS",
            Self::InvalidRecord => "INVALID_RECORD",
            Self::InvalidId => "INVALID_ID",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            // Resource Not Found
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            // Business Logic Conflicts
            Self::GameCompleted => "GAME_COMPLETED",
            Self::SessionClosed => "SESSION_CLOSED",
            Self::ChargeActive => "CHARGE_ACTIVE",
            Self::Conflict => "CONFLICT",

            // System Errors
            Self::SyncUnavailable => "SYNC_UNAVAILABLE",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }

    /// Maps a domain error onto its canonical code.
    pub fn for_domain(err: &DomainError) -> Self {
        match err {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::InvalidColor => Self::InvalidColor,
                ValidationKind::ScoreOutOfRange => Self::ScoreOutOfRange,
                ValidationKind::InvalidMultiplier => Self::InvalidMultiplier,
                ValidationKind::NotEnoughPlayers => Self::NotEnoughPlayers,
                ValidationKind::DuplicatePlayer => Self::DuplicatePlayer,
                ValidationKind::InvalidSettings => Self::InvalidSettings,
                ValidationKind::InvalidWeis => Self::InvalidWeis,
                ValidationKind::InvalidRecord => Self::InvalidRecord,
                _ => Self::ValidationError,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::GameCompleted => Self::GameCompleted,
                ConflictKind::SessionClosed => Self::SessionClosed,
                ConflictKind::ChargeActive => Self::ChargeActive,
                _ => Self::Conflict,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Session => Self::SessionNotFound,
                NotFoundKind::Game => Self::GameNotFound,
                _ => Self::NotFound,
            },
            DomainError::Infra(kind, _) => match kind {
                InfraErrorKind::SyncUnavailable => Self::SyncUnavailable,
                _ => Self::Internal,
            },
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
