//! Core rate limiter implementation.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::window::{Limit, RateWindowEntry, WINDOW_SIZE_MS};

/// Per-key fixed-window rate limiter.
///
/// Each key gets its own counter which is reset, not decayed, once its window
/// has run for the full window length. A burst of up to twice the limit is
/// therefore possible across a window boundary.
///
/// This struct is thread-safe and can be shared across multiple tasks. The
/// read-decide-increment sequence of [`RateLimiter::check`] runs under the
/// key's shard lock, so concurrent checks for the same key never overshoot.
pub struct RateLimiter {
    /// Window counters indexed by key
    entries: DashMap<String, RateWindowEntry>,
    /// Length of every window
    window_size_ms: i64,
    /// Source of the current time
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a rate limiter with one-minute windows on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a rate limiter with one-minute windows on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_window(clock, WINDOW_SIZE_MS)
    }

    /// Create a rate limiter with a custom window length.
    pub fn with_window(clock: Arc<dyn Clock>, window_size_ms: i64) -> Self {
        Self {
            entries: DashMap::new(),
            window_size_ms,
            clock,
        }
    }

    /// Record a request for `key` and decide whether it is allowed.
    ///
    /// `-1` always allows and `0` always denies; neither touches state.
    pub fn check(&self, key: &str, limit: i64) -> bool {
        let max = match Limit::from_config(limit) {
            Limit::Unlimited => return true,
            Limit::Disabled => return false,
            Limit::PerWindow(max) => max,
        };

        let now = self.clock.now_ms();

        trace!(key = %key, limit = max, "Checking rate limit");

        match self.entries.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                debug!(key = %key, "Opening rate limit window");
                vacant.insert(RateWindowEntry::open(now));
                true
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();

                if entry.is_expired(now, self.window_size_ms) {
                    debug!(
                        key = %key,
                        previous_count = entry.count,
                        "Rate limit window expired, resetting"
                    );
                    *entry = RateWindowEntry::open(now);
                    return true;
                }

                if entry.count >= max {
                    debug!(key = %key, count = entry.count, limit = max, "Rate limit exceeded");
                    return false;
                }

                entry.count += 1;
                true
            }
        }
    }

    /// Remaining budget for `key` in its current window.
    ///
    /// Returns `-1` for unlimited. This never modifies state, even when the
    /// stored window has expired.
    pub fn get_remaining(&self, key: &str, limit: i64) -> i64 {
        let max = match Limit::from_config(limit) {
            Limit::Unlimited => return -1,
            Limit::Disabled => return 0,
            Limit::PerWindow(max) => max,
        };

        let now = self.clock.now_ms();

        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now, self.window_size_ms) => {
                max.saturating_sub(entry.count) as i64
            }
            _ => max as i64,
        }
    }

    /// Time until the window for `key` resets.
    ///
    /// Returns `None` when the key has no open window.
    pub fn time_until_reset(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now, self.window_size_ms))
            .map(|entry| entry.time_until_reset(now, self.window_size_ms))
    }

    /// Forget the counter for `key`.
    pub fn reset(&self, key: &str) {
        if self.entries.remove(key).is_some() {
            debug!(key = %key, "Rate limit counter reset");
        }
    }

    /// Forget all counters.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get the number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window_size_ms(&self) -> i64 {
        self.window_size_ms
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
