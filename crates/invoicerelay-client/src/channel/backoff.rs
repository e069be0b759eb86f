use std::time::Duration;

use crate::config::ChannelConfig;

/// Exponential reconnect schedule: attempt `n` (1-based) waits `base * 2^(n-1)`,
/// and at most `max_attempts` attempts are scheduled per outage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max_attempts: u32,
}

impl Backoff {
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self { base, max_attempts }
    }

    pub fn from_config(cfg: &ChannelConfig) -> Self {
        Self::new(cfg.base_reconnect_delay(), cfg.max_reconnect_attempts)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether another attempt may be scheduled after `attempts_so_far`.
    pub fn allows(&self, attempts_so_far: u32) -> bool {
        attempts_so_far < self.max_attempts
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }

    /// Every delay this schedule can produce, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=self.max_attempts).map(move |n| self.delay(n))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&ChannelConfig::default())
    }
}
