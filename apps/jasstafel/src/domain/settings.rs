//! Game settings: score targets, color multipliers and stroke rules.
//!
//! Settings are owned by the session and copied into every game when it is
//! created, so a stored game always carries the rules it was played under.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::colors::JassColor;
use crate::errors::domain::{DomainError, ValidationKind};

pub const MIN_MULTIPLIER: u8 = 1;
pub const MAX_MULTIPLIER: u8 = 8;
pub const MAX_STROKE_RULE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTargets {
    pub sieg: u32,
    pub berg: u32,
    pub schneider: u32,
}

impl Default for ScoreTargets {
    fn default() -> Self {
        Self {
            sieg: 2000,
            berg: 1000,
            schneider: 1000,
        }
    }
}

/// Which optional score modes are active. Sieg is always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreToggles {
    pub berg: bool,
    pub schneider: bool,
}

impl Default for ScoreToggles {
    fn default() -> Self {
        Self {
            berg: true,
            schneider: true,
        }
    }
}

/// Stroke value awarded for Schneider and Kontermatsch; 0 disables the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeRules {
    pub schneider: u8,
    pub kontermatsch: u8,
}

impl Default for StrokeRules {
    fn default() -> Self {
        Self {
            schneider: 2,
            kontermatsch: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorMultipliers(BTreeMap<JassColor, u8>);

impl ColorMultipliers {
    pub fn new(values: BTreeMap<JassColor, u8>) -> Self {
        Self(values)
    }

    /// Returns a copy with one color's multiplier replaced.
    pub fn with(mut self, color: JassColor, multiplier: u8) -> Self {
        self.0.insert(color, multiplier);
        self
    }

    pub fn multiplier(&self, color: JassColor) -> Result<u8, DomainError> {
        match self.0.get(&color) {
            Some(&m) if (MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&m) => Ok(m),
            Some(&m) => Err(DomainError::validation(
                ValidationKind::InvalidMultiplier,
                format!("Multiplier {m} for {color} is outside {MIN_MULTIPLIER}..={MAX_MULTIPLIER}"),
            )),
            None => Err(DomainError::validation(
                ValidationKind::InvalidColor,
                format!("No multiplier configured for {color}"),
            )),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (JassColor, u8)> + '_ {
        self.0.iter().map(|(c, m)| (*c, *m))
    }
}

impl Default for ColorMultipliers {
    fn default() -> Self {
        let values = [
            (JassColor::Misere, 1),
            (JassColor::Eicheln, 1),
            (JassColor::Rosen, 1),
            (JassColor::Schellen, 2),
            (JassColor::Schilten, 2),
            (JassColor::Obe, 3),
            (JassColor::Une, 3),
            (JassColor::DreiMalDrei, 4),
            (JassColor::Quer, 4),
            (JassColor::Slalom, 4),
        ];
        Self(values.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub score_targets: ScoreTargets,
    #[serde(default)]
    pub enabled: ScoreToggles,
    pub color_multipliers: ColorMultipliers,
    pub stroke_rules: StrokeRules,
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |detail: String| DomainError::validation(ValidationKind::InvalidSettings, detail);
        let targets = &self.score_targets;

        if targets.sieg == 0 {
            return Err(invalid("Sieg target must be positive".into()));
        }
        if self.enabled.berg && (targets.berg == 0 || targets.berg >= targets.sieg) {
            return Err(invalid(format!(
                "Berg target {} must lie between 1 and the Sieg target {}",
                targets.berg, targets.sieg
            )));
        }
        if self.enabled.schneider && targets.schneider > targets.sieg {
            return Err(invalid(format!(
                "Schneider threshold {} exceeds the Sieg target {}",
                targets.schneider, targets.sieg
            )));
        }
        for color in JassColor::ALL {
            self.color_multipliers
                .multiplier(color)
                .map_err(|e| invalid(e.to_string()))?;
        }
        let rules = &self.stroke_rules;
        if rules.schneider > MAX_STROKE_RULE || rules.kontermatsch > MAX_STROKE_RULE {
            return Err(invalid(format!(
                "Stroke rules must be 0, 1 or 2 (schneider={}, kontermatsch={})",
                rules.schneider, rules.kontermatsch
            )));
        }
        Ok(())
    }

    pub fn multiplier(&self, color: JassColor) -> Result<u8, DomainError> {
        self.color_multipliers.multiplier(color)
    }
}
