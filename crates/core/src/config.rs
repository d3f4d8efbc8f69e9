// Queue Configuration
//
// Loaded from environment variables via the `config` crate, e.g.
//   DRAINQ_INTERVAL_MS=50

use crate::domain::{DrainInterval, DEFAULT_INTERVAL_MS};
use crate::error::{AppError, Result};
use serde::Deserialize;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DRAINQ";

/// Construction-time queue settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Drain period in milliseconds (must be > 0)
    pub interval_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl QueueConfig {
    pub fn new(interval_ms: u64) -> Self {
        Self { interval_ms }
    }

    /// Load from `DRAINQ_*` environment variables, defaults for anything unset
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()?;

        let loaded: QueueConfig = settings.try_deserialize()?;
        loaded.validate()?;

        tracing::debug!(interval_ms = loaded.interval_ms, "Queue configuration loaded");
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(AppError::Validation(
                "interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Result<DrainInterval> {
        Ok(DrainInterval::from_millis(self.interval_ms)?)
    }
}
