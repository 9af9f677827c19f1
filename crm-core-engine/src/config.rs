//! Scheduler configuration, loaded from `config/engine.toml` with
//! `CRM_CORE`-prefixed environment variable overrides.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct JobConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Full recalculation of all active projects.
    #[serde(default = "default_full_recalc")]
    pub full_recalc: JobConfig,
    /// Drift detection and repair pass.
    #[serde(default = "default_drift_repair")]
    pub drift_repair: JobConfig,
    /// Liveness heartbeat, logs only. Opt-in.
    #[serde(default = "default_heartbeat")]
    pub heartbeat: JobConfig,
}

fn default_full_recalc() -> JobConfig {
    JobConfig {
        enabled: true,
        interval_secs: 6 * 60 * 60,
    }
}

fn default_drift_repair() -> JobConfig {
    JobConfig {
        enabled: true,
        interval_secs: 24 * 60 * 60,
    }
}

fn default_heartbeat() -> JobConfig {
    JobConfig {
        enabled: false,
        interval_secs: 60 * 60,
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            full_recalc: default_full_recalc(),
            drift_repair: default_drift_repair(),
            heartbeat: default_heartbeat(),
        }
    }
}

impl SchedulerConfig {
    /// Load from `config/engine.toml` (optional) and environment variables
    /// such as `CRM_CORE__SCHEDULER__FULL_RECALC__INTERVAL_SECS`.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/engine.toml").required(false))
            .add_source(Environment::with_prefix("CRM_CORE").separator("__"))
            .build()?;

        match settings.get::<SchedulerConfig>("scheduler") {
            Ok(config) => Ok(config),
            // No scheduler section anywhere: run with the defaults.
            Err(ConfigError::NotFound(_)) => Ok(SchedulerConfig::default()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_job_cadence() {
        let config = SchedulerConfig::default();
        assert!(config.full_recalc.enabled);
        assert_eq!(config.full_recalc.interval_secs, 21_600);
        assert!(config.drift_repair.enabled);
        assert_eq!(config.drift_repair.interval_secs, 86_400);
        assert!(!config.heartbeat.enabled);
        assert_eq!(config.heartbeat.interval_secs, 3_600);
    }
}
