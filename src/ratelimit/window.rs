//! Fixed-window counter state and limit semantics.

use std::time::Duration;

/// Length of every rate limit window.
pub const WINDOW_SIZE_MS: i64 = 60_000;

/// How many requests a key may make per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    /// Every request is accepted and nothing is tracked
    Unlimited,
    /// Every request is rejected and nothing is tracked
    Disabled,
    /// At most this many accepted requests per window
    PerWindow(u64),
}

impl Limit {
    /// Interpret a configured integer limit.
    ///
    /// `-1` is unlimited and `0` is disabled. Any other negative value is
    /// treated as disabled.
    pub fn from_config(value: i64) -> Self {
        match value {
            -1 => Limit::Unlimited,
            v if v <= 0 => Limit::Disabled,
            v => Limit::PerWindow(v as u64),
        }
    }
}

/// Per-key counter for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindowEntry {
    /// Requests accepted since `window_start`, always at least 1
    pub count: u64,
    /// When the window was opened, in milliseconds since the epoch
    pub window_start: i64,
}

impl RateWindowEntry {
    /// Open a new window holding the request that opened it.
    pub fn open(now_ms: i64) -> Self {
        Self {
            count: 1,
            window_start: now_ms,
        }
    }

    /// Whether the window has run its full length.
    pub fn is_expired(&self, now_ms: i64, window_ms: i64) -> bool {
        now_ms.saturating_sub(self.window_start) >= window_ms
    }

    /// Time left until the window expires.
    pub fn time_until_reset(&self, now_ms: i64, window_ms: i64) -> Duration {
        let elapsed = now_ms.saturating_sub(self.window_start).max(0);
        let left = window_ms.saturating_sub(elapsed).max(0);
        Duration::from_millis(left as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_from_config() {
        assert_eq!(Limit::from_config(-1), Limit::Unlimited);
        assert_eq!(Limit::from_config(0), Limit::Disabled);
        assert_eq!(Limit::from_config(-7), Limit::Disabled);
        assert_eq!(Limit::from_config(3), Limit::PerWindow(3));
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let entry = RateWindowEntry::open(1_000);
        assert_eq!(entry.count, 1);
        assert!(!entry.is_expired(1_000, WINDOW_SIZE_MS));
        assert!(!entry.is_expired(60_999, WINDOW_SIZE_MS));
        assert!(entry.is_expired(61_000, WINDOW_SIZE_MS));
    }

    #[test]
    fn test_entry_clock_going_backwards_is_not_expired() {
        let entry = RateWindowEntry::open(100_000);
        assert!(!entry.is_expired(50_000, WINDOW_SIZE_MS));
        assert_eq!(
            entry.time_until_reset(50_000, WINDOW_SIZE_MS),
            Duration::from_millis(60_000)
        );
    }

    #[test]
    fn test_time_until_reset() {
        let entry = RateWindowEntry::open(0);
        assert_eq!(
            entry.time_until_reset(15_000, WINDOW_SIZE_MS),
            Duration::from_secs(45)
        );
        assert_eq!(entry.time_until_reset(90_000, WINDOW_SIZE_MS), Duration::ZERO);
    }
}
