//! Reconnect delay schedule.

use std::time::Duration;

/// Bounds and growth factor for [`Backoff`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackoffConfig {
    /// First delay.
    pub min: Duration,
    /// Upper bound on any delay.
    pub max: Duration,
    /// Growth per attempt. Values below 1 are treated as 2.
    pub factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig {
            min: Duration::from_secs(1),
            max: Duration::from_secs(5 * 60),
            factor: 2.0,
        }
    }
}

/// Exponential backoff: `min * factor^n`, capped at `max`.
///
/// The exponent only grows while the delay is below the cap, so once the cap
/// is reached every further call returns `max`.
///
/// ```
/// use std::time::Duration;
/// use slirc_relay::backoff::{Backoff, BackoffConfig};
///
/// let mut b = Backoff::new(BackoffConfig {
///     min: Duration::from_secs(1),
///     max: Duration::from_secs(5),
///     factor: 2.0,
/// });
/// let delays: Vec<_> = (0..5).map(|_| b.next_delay().as_secs()).collect();
/// assert_eq!(delays, [1, 2, 4, 5, 5]);
/// ```
#[derive(Clone, Debug)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Backoff { config, attempt: 0 }
    }

    /// The delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let factor = if self.config.factor < 1.0 {
            2.0
        } else {
            self.config.factor
        };

        let max = self.config.max.as_secs_f64();
        let delay = self.config.min.as_secs_f64() * factor.powf(f64::from(self.attempt));

        if delay >= max || !delay.is_finite() {
            self.config.max
        } else {
            self.attempt += 1;
            Duration::from_secs_f64(delay)
        }
    }

    /// Start the schedule over.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::new(BackoffConfig::default())
    }
}
