//! Pure scoring arithmetic for one round.

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Card points available in one round.
pub const ROUND_POINTS: u32 = 157;
/// Sentinel raw score for a Matsch: the acting team takes every trick.
pub const MATSCH_POINTS: u32 = 257;

/// Points awarded to both teams for a submitted round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundScore {
    pub acting_score: u32,
    pub opponent_score: u32,
}

impl RoundScore {
    pub fn total(&self) -> u32 {
        self.acting_score + self.opponent_score
    }
}

/// True when `raw_score` is the Matsch sentinel.
#[inline]
pub fn is_matsch(raw_score: i32) -> bool {
    raw_score == MATSCH_POINTS as i32
}

/// Apply the color multiplier to a raw round score.
///
/// Raw scores must lie in `0..=157` or be the Matsch sentinel `257`; anything
/// else is rejected rather than clamped.
pub fn apply(raw_score: i32, multiplier: u8) -> Result<RoundScore, DomainError> {
    if multiplier == 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidMultiplier,
            "Multiplier must be at least 1",
        ));
    }
    let m = u32::from(multiplier);

    if is_matsch(raw_score) {
        return Ok(RoundScore {
            acting_score: MATSCH_POINTS * m,
            opponent_score: 0,
        });
    }

    let raw = u32::try_from(raw_score)
        .ok()
        .filter(|r| *r <= ROUND_POINTS)
        .ok_or_else(|| {
            DomainError::validation(
                ValidationKind::ScoreOutOfRange,
                format!("Round score {raw_score} must be between 0 and {ROUND_POINTS} or {MATSCH_POINTS}"),
            )
        })?;

    Ok(RoundScore {
        acting_score: raw * m,
        opponent_score: (ROUND_POINTS - raw) * m,
    })
}
