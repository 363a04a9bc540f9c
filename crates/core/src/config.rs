//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! core services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use chrono::Duration;

use crate::error::{ClinicError, ClinicResult};

/// Minimum separation between two bookings for the same practitioner.
pub const MIN_SEPARATION_MINUTES: i64 = 10;

/// Default number of attempts for transiently failing storage calls.
pub const DEFAULT_STORAGE_ATTEMPTS: u32 = 3;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    min_separation: Duration,
    storage_attempts: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if the separation window is not
    /// positive or the attempt budget is zero.
    pub fn new(min_separation: Duration, storage_attempts: u32) -> ClinicResult<Self> {
        if min_separation <= Duration::zero() {
            return Err(ClinicError::InvalidInput(
                "minimum separation must be positive".into(),
            ));
        }
        if storage_attempts == 0 {
            return Err(ClinicError::InvalidInput(
                "storage attempt budget must be at least 1".into(),
            ));
        }

        Ok(Self {
            min_separation,
            storage_attempts,
        })
    }

    pub fn min_separation(&self) -> Duration {
        self.min_separation
    }

    pub fn storage_attempts(&self) -> u32 {
        self.storage_attempts
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            min_separation: Duration::minutes(MIN_SEPARATION_MINUTES),
            storage_attempts: DEFAULT_STORAGE_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_ten_minute_window() {
        let config = CoreConfig::default();
        assert_eq!(config.min_separation(), Duration::minutes(10));
        assert_eq!(config.storage_attempts(), 3);
    }

    #[test]
    fn test_rejects_non_positive_separation() {
        assert!(CoreConfig::new(Duration::zero(), 3).is_err());
        assert!(CoreConfig::new(Duration::minutes(-5), 3).is_err());
    }

    #[test]
    fn test_rejects_zero_attempts() {
        assert!(CoreConfig::new(Duration::minutes(10), 0).is_err());
    }
}
