//! Press-hold-release protocol for declarations.
//!
//! A gesture moves `Idle -> Charging -> Resolved -> Idle`. The charge level
//! is cosmetic only; it never reaches domain arithmetic. Ticks are driven
//! from outside (see `services::charge_ticker`), so the state machine itself
//! owns no timer.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::domain::game::Declaration;
use crate::domain::team::TeamPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeConfig {
    pub tick: Duration,
    pub full_charge: Duration,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            full_charge: Duration::from_millis(2000),
        }
    }
}

/// Charge level after holding for `elapsed`, bounded to `[0.0, 1.0]`.
pub fn level_for_elapsed(elapsed: Duration, full_charge: Duration) -> f32 {
    if full_charge.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / full_charge.as_secs_f32()).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeIntensity {
    None,
    Low,
    Medium,
    High,
    Super,
    Extreme,
}

impl ChargeIntensity {
    pub fn from_level(level: f32) -> Self {
        match level {
            l if l >= 1.0 => ChargeIntensity::Extreme,
            l if l >= 0.8 => ChargeIntensity::Super,
            l if l >= 0.6 => ChargeIntensity::High,
            l if l >= 0.4 => ChargeIntensity::Medium,
            l if l >= 0.2 => ChargeIntensity::Low,
            _ => ChargeIntensity::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargePhase {
    Idle,
    Charging { level: f32, ticks: u32 },
    Resolved,
}

#[derive(Debug, Clone)]
pub struct ChargeGesture {
    action: Declaration,
    team: TeamPosition,
    phase: ChargePhase,
    config: ChargeConfig,
}

impl ChargeGesture {
    pub fn new(action: Declaration, team: TeamPosition, config: ChargeConfig) -> Self {
        Self {
            action,
            team,
            phase: ChargePhase::Idle,
            config,
        }
    }

    pub fn action(&self) -> Declaration {
        self.action
    }

    pub fn team(&self) -> TeamPosition {
        self.team
    }

    pub fn phase(&self) -> ChargePhase {
        self.phase
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.phase, ChargePhase::Charging { .. })
    }

    pub fn level(&self) -> f32 {
        match self.phase {
            ChargePhase::Charging { level, .. } => level,
            _ => 0.0,
        }
    }

    pub fn intensity(&self) -> ChargeIntensity {
        ChargeIntensity::from_level(self.level())
    }

    /// Start charging if idle and `precondition` holds. Pressing while
    /// already charging changes nothing.
    pub fn press(&mut self, precondition: bool) -> bool {
        if self.phase != ChargePhase::Idle || !precondition {
            return false;
        }
        self.phase = ChargePhase::Charging {
            level: 0.0,
            ticks: 0,
        };
        true
    }

    /// Advance one tick; returns the new level, or `None` when not charging.
    pub fn tick(&mut self) -> Option<f32> {
        let ChargePhase::Charging { ticks, .. } = self.phase else {
            return None;
        };
        let ticks = ticks.saturating_add(1);
        let level = level_for_elapsed(self.config.tick * ticks, self.config.full_charge);
        self.phase = ChargePhase::Charging { level, ticks };
        Some(level)
    }

    /// Resolve the charge, running `apply` exactly once, then return to idle.
    /// Releasing without a prior press is a no-op.
    pub fn release<R>(&mut self, apply: impl FnOnce(Declaration, TeamPosition) -> R) -> Option<R> {
        if !self.is_charging() {
            return None;
        }
        self.phase = ChargePhase::Resolved;
        let result = apply(self.action, self.team);
        self.phase = ChargePhase::Idle;
        Some(result)
    }

    /// Drop a charge without applying it.
    pub fn cancel(&mut self) -> bool {
        let was_charging = self.is_charging();
        self.phase = ChargePhase::Idle;
        was_charging
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCharge {
    pub action: Declaration,
    pub team: TeamPosition,
    pub level: f32,
    pub intensity: ChargeIntensity,
}

/// One gesture slot per (action, team) pair.
#[derive(Debug, Clone, Default)]
pub struct ChargeBoard {
    config: ChargeConfig,
    gestures: HashMap<(Declaration, TeamPosition), ChargeGesture>,
}

impl ChargeBoard {
    pub fn new(config: ChargeConfig) -> Self {
        Self {
            config,
            gestures: HashMap::new(),
        }
    }

    pub fn config(&self) -> ChargeConfig {
        self.config
    }

    fn slot(&mut self, action: Declaration, team: TeamPosition) -> &mut ChargeGesture {
        let config = self.config;
        self.gestures
            .entry((action, team))
            .or_insert_with(|| ChargeGesture::new(action, team, config))
    }

    pub fn press(&mut self, action: Declaration, team: TeamPosition, precondition: bool) -> bool {
        self.slot(action, team).press(precondition)
    }

    pub fn tick(&mut self, action: Declaration, team: TeamPosition) -> Option<f32> {
        self.gestures.get_mut(&(action, team))?.tick()
    }

    pub fn release<R>(
        &mut self,
        action: Declaration,
        team: TeamPosition,
        apply: impl FnOnce(Declaration, TeamPosition) -> R,
    ) -> Option<R> {
        self.gestures.get_mut(&(action, team))?.release(apply)
    }

    pub fn is_charging(&self, action: Declaration, team: TeamPosition) -> bool {
        self.gestures
            .get(&(action, team))
            .is_some_and(ChargeGesture::is_charging)
    }

    pub fn cancel(&mut self, action: Declaration, team: TeamPosition) -> bool {
        self.gestures
            .get_mut(&(action, team))
            .is_some_and(ChargeGesture::cancel)
    }

    pub fn cancel_all(&mut self) -> usize {
        self.gestures
            .values_mut()
            .map(ChargeGesture::cancel)
            .filter(|cancelled| *cancelled)
            .count()
    }

    /// Charging gestures, in a stable order.
    pub fn active(&self) -> Vec<ActiveCharge> {
        let mut active: Vec<ActiveCharge> = self
            .gestures
            .values()
            .filter(|g| g.is_charging())
            .map(|g| ActiveCharge {
                action: g.action,
                team: g.team,
                level: g.level(),
                intensity: g.intensity(),
            })
            .collect();
        active.sort_by_key(|c| (c.action, c.team));
        active
    }
}
