//! Process configuration read from `JASS_*` environment variables.
//!
//! Every variable is optional; unset variables fall back to the defaults
//! below, unparsable ones are a configuration error.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::charge::ChargeConfig;
use crate::error::AppError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CHARGE_TICK_MS: u64 = 100;
pub const DEFAULT_CHARGE_FULL_MS: u64 = 2000;
pub const DEFAULT_RESUME_GRACE_SECS: i64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub charge: ChargeConfig,
    pub resume_grace: time::Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            charge: ChargeConfig::default(),
            resume_grace: time::Duration::seconds(DEFAULT_RESUME_GRACE_SECS),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::config(format!("{name}={raw} is invalid: {e}"))),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env_or("JASS_HOST", DEFAULT_HOST.to_string())?;
        let port = env_or("JASS_PORT", DEFAULT_PORT)?;
        let tick_ms = env_or("JASS_CHARGE_TICK_MS", DEFAULT_CHARGE_TICK_MS)?;
        let full_ms = env_or("JASS_CHARGE_FULL_MS", DEFAULT_CHARGE_FULL_MS)?;
        let grace_secs = env_or("JASS_RESUME_GRACE_SECS", DEFAULT_RESUME_GRACE_SECS)?;

        if tick_ms == 0 {
            return Err(AppError::config("JASS_CHARGE_TICK_MS must be positive"));
        }
        if full_ms < tick_ms {
            return Err(AppError::config(format!(
                "JASS_CHARGE_FULL_MS ({full_ms}) must not be shorter than one tick ({tick_ms})"
            )));
        }
        if grace_secs < 0 {
            return Err(AppError::config("JASS_RESUME_GRACE_SECS must not be negative"));
        }

        Ok(Self {
            host,
            port,
            charge: ChargeConfig {
                tick: Duration::from_millis(tick_ms),
                full_charge: Duration::from_millis(full_ms),
            },
            resume_grace: time::Duration::seconds(grace_secs),
        })
    }
}
