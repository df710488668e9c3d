//! The ten Jass colors (trump modes) a round can be played in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum JassColor {
    Misere,
    Eicheln,
    Rosen,
    Schellen,
    Schilten,
    Obe,
    Une,
    DreiMalDrei,
    Quer,
    Slalom,
}

impl JassColor {
    pub const ALL: [JassColor; 10] = [
        JassColor::Misere,
        JassColor::Eicheln,
        JassColor::Rosen,
        JassColor::Schellen,
        JassColor::Schilten,
        JassColor::Obe,
        JassColor::Une,
        JassColor::DreiMalDrei,
        JassColor::Quer,
        JassColor::Slalom,
    ];

    /// Display name as used on the tally board and in stored documents.
    pub const fn as_str(&self) -> &'static str {
        match self {
            JassColor::Misere => "Misère",
            JassColor::Eicheln => "Eicheln",
            JassColor::Rosen => "Rosen",
            JassColor::Schellen => "Schellen",
            JassColor::Schilten => "Schilten",
            JassColor::Obe => "Obe",
            JassColor::Une => "Une",
            JassColor::DreiMalDrei => "3x3",
            JassColor::Quer => "Quer",
            JassColor::Slalom => "Slalom",
        }
    }
}

impl fmt::Display for JassColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JassColor {
    type Err = DomainError;

    /// Accepts the display name case-insensitively; "Misere" is accepted for "Misère".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        if needle == "misere" {
            return Ok(JassColor::Misere);
        }
        JassColor::ALL
            .into_iter()
            .find(|c| c.as_str().to_lowercase() == needle)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::InvalidColor,
                    format!("Unknown color: {s}"),
                )
            })
    }
}

impl Serialize for JassColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JassColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<JassColor>()
            .map_err(|_| serde::de::Error::custom(format!("Invalid color: {s}")))
    }
}
