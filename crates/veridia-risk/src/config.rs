//! Engine configuration.
//!
//! Numeric weights and thresholds are tunable per deployment; the defaults
//! are the reference values validated by the scenario tests. Environment
//! loading follows the platform convention of a `from_reader` seam so tests
//! can inject variables without touching process-global state.

use std::time::Duration;
use thiserror::Error;

use crate::scoring::{RiskThresholds, ScoringWeights};

/// Configuration for the risk evaluation engine.
#[derive(Debug, Clone)]
pub struct RiskEngineConfig {
    /// Total evaluation budget in milliseconds. The whole `evaluate` call
    /// runs under this deadline; overrun is a `DeadlineExceeded` error.
    pub total_budget_ms: u64,

    /// Individual timeout for each signal fetch, carved from the total
    /// budget. Must not exceed `total_budget_ms`.
    pub signal_timeout_ms: u64,

    /// Recent authentication failures above which the recommendation is
    /// always `deny`.
    pub auth_failure_limit: u32,

    /// Score formula weights.
    pub weights: ScoringWeights,

    /// Risk level boundaries.
    pub thresholds: RiskThresholds,
}

impl Default for RiskEngineConfig {
    fn default() -> Self {
        Self {
            total_budget_ms: 40,
            signal_timeout_ms: 30,
            auth_failure_limit: 5,
            weights: ScoringWeights::default(),
            thresholds: RiskThresholds::default(),
        }
    }
}

impl RiskEngineConfig {
    /// Total evaluation budget as a [`Duration`].
    #[must_use]
    pub fn total_budget(&self) -> Duration {
        Duration::from_millis(self.total_budget_ms)
    }

    /// Per-signal timeout as a [`Duration`].
    #[must_use]
    pub fn signal_timeout(&self) -> Duration {
        Duration::from_millis(self.signal_timeout_ms)
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let total_budget_ms = parse_or(&reader, "RISK_TOTAL_BUDGET_MS", 40)?;
        let signal_timeout_ms = parse_or(&reader, "RISK_SIGNAL_TIMEOUT_MS", 30)?;
        let auth_failure_limit = parse_or(&reader, "RISK_AUTH_FAILURE_LIMIT", 5)?;

        let thresholds = RiskThresholds {
            medium: parse_or(&reader, "RISK_THRESHOLD_MEDIUM", 0.35)?,
            high: parse_or(&reader, "RISK_THRESHOLD_HIGH", 0.65)?,
            critical: parse_or(&reader, "RISK_THRESHOLD_CRITICAL", 0.85)?,
        };
        thresholds
            .validate()
            .map_err(|e| ConfigError::InvalidValue("RISK_THRESHOLD_*".into(), e))?;

        let config = Self {
            total_budget_ms,
            signal_timeout_ms,
            auth_failure_limit,
            weights: ScoringWeights::default(),
            thresholds,
        };

        if config.signal_timeout_ms > config.total_budget_ms {
            return Err(ConfigError::InvalidValue(
                "RISK_SIGNAL_TIMEOUT_MS".into(),
                format!(
                    "signal timeout {}ms exceeds total budget {}ms",
                    config.signal_timeout_ms, config.total_budget_ms
                ),
            ));
        }

        Ok(config)
    }
}

fn parse_or<F, T>(reader: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match reader(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was present but could not be parsed or was out of range.
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
