//! Bounded exponential backoff for feed reconnection.

use std::time::Duration;

use leadline_types::config::ReconnectConfig;

/// Tracks consecutive reconnect attempts.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectConfig,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: ReconnectConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Consecutive attempts made since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Advance to the next attempt and return how long to wait before it.
    ///
    /// Returns `None` once `max_attempts` attempts have been used up.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.config.max_attempts {
            return None;
        }
        let delay = self.delay_for(self.attempt);
        self.attempt += 1;
        Some(delay)
    }

    /// A successful re-fetch starts the budget over.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.config.multiplier.max(1.0).powi(attempt as i32);
        let ms = (self.config.initial_delay_ms as f64 * factor).min(self.config.max_delay_ms as f64);
        Duration::from_millis(ms as u64)
    }
}
