//! Controller and pairing-sequence configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::{Error, Result};

/// Timing and addressing for the child-tile pairing sequence.
///
/// The defaults reproduce the fixed script the tile SDK expects: a 20 second
/// discovery window with a 1 second countdown tick, half-second settles
/// around confirmation and each activation, a 1 second delay before the
/// final verification query, and an unconditional activation loop over child
/// indices 1 through 6.
#[derive(Debug, Clone)]
pub struct PairingConfig {
    /// How long to wait after the online-tiles query while the transport
    /// auto-pairs discovered tiles.
    pub discovery_wait: Duration,
    /// Interval of the cosmetic countdown log during the discovery wait.
    pub countdown_tick: Duration,
    /// Pause after confirming tile assignment.
    pub confirm_settle: Duration,
    /// Pause after each per-tile activation command.
    pub activation_gap: Duration,
    /// Pause before the final paired-tiles query.
    pub verify_delay: Duration,
    /// Child tile addresses to activate, in order.
    pub child_tiles: RangeInclusive<u8>,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            discovery_wait: Duration::from_secs(20),
            countdown_tick: Duration::from_secs(1),
            confirm_settle: Duration::from_millis(500),
            activation_gap: Duration::from_millis(500),
            verify_delay: Duration::from_secs(1),
            child_tiles: 1..=6,
        }
    }
}

impl PairingConfig {
    /// A compressed schedule for tests and simulations.
    ///
    /// Keeps the same step structure with millisecond-scale pauses.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            discovery_wait: Duration::from_millis(20),
            countdown_tick: Duration::from_millis(5),
            confirm_settle: Duration::from_millis(1),
            activation_gap: Duration::from_millis(1),
            verify_delay: Duration::from_millis(1),
            child_tiles: 1..=6,
        }
    }

    /// Validate the configuration.
    ///
    /// Rejects zero-length waits (the countdown tick must be able to fire)
    /// and an empty child range.
    pub fn validate(&self) -> Result<()> {
        if self.countdown_tick.is_zero() {
            return Err(Error::invalid_config("countdown_tick must be > 0"));
        }
        if self.discovery_wait.is_zero() {
            return Err(Error::invalid_config("discovery_wait must be > 0"));
        }
        if self.child_tiles.is_empty() {
            return Err(Error::invalid_config("child_tiles range must be non-empty"));
        }
        Ok(())
    }
}

/// Configuration for the [`Controller`](crate::Controller).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Pairing sequence timing.
    pub pairing: PairingConfig,
    /// Capacity of the controller event channel.
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            pairing: PairingConfig::default(),
            event_capacity: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pairing_timing() {
        let config = PairingConfig::default();
        assert_eq!(config.discovery_wait, Duration::from_secs(20));
        assert_eq!(config.countdown_tick, Duration::from_secs(1));
        assert_eq!(config.confirm_settle, Duration::from_millis(500));
        assert_eq!(config.activation_gap, Duration::from_millis(500));
        assert_eq!(config.verify_delay, Duration::from_secs(1));
        assert_eq!(config.child_tiles, 1..=6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fast_config_is_valid() {
        assert!(PairingConfig::fast().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let config = PairingConfig {
            countdown_tick: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_empty_child_range() {
        let config = PairingConfig {
            child_tiles: 1..=0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
