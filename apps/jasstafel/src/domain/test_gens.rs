// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::colors::JassColor;
use crate::domain::history::Direction;
use crate::domain::scoring::{MATSCH_POINTS, ROUND_POINTS};
use crate::domain::tally::Denomination;
use crate::domain::team::TeamPosition;

pub fn color() -> impl Strategy<Value = JassColor> {
    prop::sample::select(JassColor::ALL.to_vec())
}

pub fn team() -> impl Strategy<Value = TeamPosition> {
    prop_oneof![Just(TeamPosition::Top), Just(TeamPosition::Bottom)]
}

pub fn denomination() -> impl Strategy<Value = Denomination> {
    prop::sample::select(Denomination::ALL.to_vec())
}

pub fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Backward),
        Just(Direction::Forward),
        Just(Direction::Latest)
    ]
}

/// Any accepted raw score, including the Matsch sentinel.
pub fn raw_score() -> impl Strategy<Value = i32> {
    prop_oneof![
        9 => 0..=ROUND_POINTS as i32,
        1 => Just(MATSCH_POINTS as i32),
    ]
}

pub fn multiplier() -> impl Strategy<Value = u8> {
    1u8..=8u8
}

/// A round as (acting team, color, raw score).
pub fn round() -> impl Strategy<Value = (TeamPosition, JassColor, i32)> {
    (team(), color(), raw_score())
}
