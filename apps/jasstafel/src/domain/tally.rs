//! Stroke tallies as drawn on the chalk board.
//!
//! `encode` turns a stroke count into groups of marks; `breakdown` splits a
//! point total into the per-denomination stroke counts the board displays.
//! Both are pure functions of their arguments.

use serde::{Deserialize, Serialize};

use crate::errors::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Denomination {
    Twenty,
    Fifty,
    Hundred,
}

impl Denomination {
    pub const ALL: [Denomination; 3] = [
        Denomination::Twenty,
        Denomination::Fifty,
        Denomination::Hundred,
    ];

    pub const fn value(self) -> u32 {
        match self {
            Denomination::Twenty => 20,
            Denomination::Fifty => 50,
            Denomination::Hundred => 100,
        }
    }
}

impl From<Denomination> for u32 {
    fn from(d: Denomination) -> Self {
        d.value()
    }
}

impl TryFrom<u32> for Denomination {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            20 => Ok(Denomination::Twenty),
            50 => Ok(Denomination::Fifty),
            100 => Ok(Denomination::Hundred),
            other => Err(DomainError::validation_other(format!(
                "Denomination must be 20, 50 or 100, got {other}"
            ))),
        }
    }
}

/// One visual unit of a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TallyGroup {
    /// Four parallel ticks closed by a diagonal: five strokes.
    Gate,
    /// An unfinished gate of 1..=4 parallel ticks.
    Ticks { count: u8 },
    /// A crossed pair standing for ten strokes.
    Cross,
    /// A diagonal crossed by a second stroke: two strokes.
    Hybrid,
    /// A lone diagonal still waiting for its crossing stroke.
    Diagonal,
}

impl TallyGroup {
    pub fn strokes(&self) -> u32 {
        match self {
            TallyGroup::Gate => 5,
            TallyGroup::Ticks { count } => u32::from(*count),
            TallyGroup::Cross => 10,
            TallyGroup::Hybrid => 2,
            TallyGroup::Diagonal => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyShape {
    pub denomination: Denomination,
    pub count: u32,
    pub groups: Vec<TallyGroup>,
}

impl TallyShape {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Strokes represented by all groups; always equals `count`.
    pub fn strokes(&self) -> u32 {
        self.groups.iter().map(TallyGroup::strokes).sum()
    }
}

/// Encode `count` strokes for the given denomination.
pub fn encode(count: u32, denomination: Denomination) -> TallyShape {
    let mut groups = Vec::new();
    match denomination {
        Denomination::Twenty => push_gates(count, &mut groups),
        Denomination::Hundred => {
            groups.extend(std::iter::repeat(TallyGroup::Cross).take((count / 10) as usize));
            push_gates(count % 10, &mut groups);
        }
        Denomination::Fifty => {
            groups.extend(std::iter::repeat(TallyGroup::Hybrid).take((count / 2) as usize));
            if count % 2 == 1 {
                groups.push(TallyGroup::Diagonal);
            }
        }
    }
    TallyShape {
        denomination,
        count,
        groups,
    }
}

fn push_gates(count: u32, groups: &mut Vec<TallyGroup>) {
    groups.extend(std::iter::repeat(TallyGroup::Gate).take((count / 5) as usize));
    let rest = (count % 5) as u8;
    if rest > 0 {
        groups.push(TallyGroup::Ticks { count: rest });
    }
}

/// A point total split into board strokes per denomination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBreakdown {
    pub hundreds: u32,
    pub fifties: u32,
    pub twenties: u32,
    /// Points too small to earn a stroke; written as a number on the board.
    pub remainder: u32,
}

impl PointBreakdown {
    pub fn count_for(&self, denomination: Denomination) -> u32 {
        match denomination {
            Denomination::Twenty => self.twenties,
            Denomination::Fifty => self.fifties,
            Denomination::Hundred => self.hundreds,
        }
    }

    pub fn points(&self) -> u32 {
        self.hundreds * 100 + self.fifties * 50 + self.twenties * 20 + self.remainder
    }
}

/// Split `points` into hundreds, fifties and twenties the way the board is chalked.
///
/// Within each hundred the fifty row is preferred only where it leaves no
/// fewer twenties than necessary: 90 is 50+20+20, 80 is four twenties.
pub fn breakdown(points: u32) -> PointBreakdown {
    let hundreds = points / 100;
    let rest = points % 100;
    let (fifties, twenties, used) = match rest {
        90.. => (1, 2, 90),
        80.. => (0, 4, 80),
        70.. => (1, 1, 70),
        60.. => (0, 3, 60),
        50.. => (1, 0, 50),
        20.. => (0, rest / 20, (rest / 20) * 20),
        _ => (0, 0, 0),
    };
    PointBreakdown {
        hundreds,
        fifties,
        twenties,
        remainder: rest - used,
    }
}
