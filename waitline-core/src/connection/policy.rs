//! Reconnect policy.

use std::time::Duration;

/// Maximum number of reconnect attempts in one disconnection episode.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Delay before the first reconnect attempt.
pub const BASE_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Bounded, linearly scaled reconnect backoff.
///
/// Attempt `n` (1-based) waits `base_delay * n`; after `max_attempts`
/// the manager gives up until it is reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RECONNECT_ATTEMPTS,
            base_delay: BASE_RECONNECT_DELAY,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt number `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Whether another attempt is allowed after `attempts_made`.
    pub fn allows(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }
}
