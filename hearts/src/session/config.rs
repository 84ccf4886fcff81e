//! Game session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session actor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bounded capacity of each session's inbox
    pub inbox_capacity: usize,

    /// How often the session checks for abandonment, in milliseconds
    pub tick_interval_ms: u64,

    /// How long a game may sit with nobody connected before it is abandoned,
    /// in seconds
    pub abandon_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: 100,
            tick_interval_ms: 1000,
            abandon_timeout_secs: 300,
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be at least 1".to_string());
        }

        if self.tick_interval_ms == 0 {
            return Err("Tick interval must be at least 1ms".to_string());
        }

        if self.abandon_timeout_secs == 0 {
            return Err("Abandon timeout must be at least 1 second".to_string());
        }

        if self.abandon_timeout_secs.saturating_mul(1000) < self.tick_interval_ms {
            return Err("Abandon timeout must not be shorter than the tick interval".to_string());
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn abandon_timeout(&self) -> Duration {
        Duration::from_secs(self.abandon_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.abandon_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_invalid_configs() {
        let zero_inbox = SessionConfig {
            inbox_capacity: 0,
            ..Default::default()
        };
        assert!(zero_inbox.validate().is_err());

        let zero_tick = SessionConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert!(zero_tick.validate().is_err());

        let timeout_below_tick = SessionConfig {
            tick_interval_ms: 5000,
            abandon_timeout_secs: 2,
            ..Default::default()
        };
        assert!(timeout_below_tick.validate().is_err());
    }
}
