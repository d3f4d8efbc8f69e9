// Drain Interval Domain Model

use super::error::{DomainError, Result};
use std::time::Duration;

/// Default drain period (250ms)
pub const DEFAULT_INTERVAL_MS: u64 = 250;

/// Period between two drain ticks
///
/// Always non-zero: a zero-period timer would spin, so construction
/// rejects it instead of clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrainInterval(Duration);

impl DrainInterval {
    pub fn new(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(DomainError::InvalidInterval(
                "period must be greater than zero".to_string(),
            ));
        }
        Ok(Self(period))
    }

    pub fn from_millis(ms: u64) -> Result<Self> {
        Self::new(Duration::from_millis(ms))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_millis(&self) -> u128 {
        self.0.as_millis()
    }
}

impl Default for DrainInterval {
    fn default() -> Self {
        Self(Duration::from_millis(DEFAULT_INTERVAL_MS))
    }
}

impl TryFrom<Duration> for DrainInterval {
    type Error = DomainError;

    fn try_from(period: Duration) -> Result<Self> {
        Self::new(period)
    }
}

impl From<DrainInterval> for Duration {
    fn from(interval: DrainInterval) -> Self {
        interval.0
    }
}

impl std::fmt::Display for DrainInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}
