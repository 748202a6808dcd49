use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use super::window::{Decision, RateLimitWindow};
use crate::config::{LimitConfig, WindowStrategy};

/// One independently configured limiter: `limit` requests per `window`
/// for every distinct key.
pub struct KeyedLimiter {
    name: String,
    limit: u32,
    window: Duration,
    strategy: WindowStrategy,
    idle_timeout: Duration,
    windows: DashMap<String, RateLimitWindow>,
}

impl KeyedLimiter {
    pub fn new(name: impl Into<String>, config: &LimitConfig, idle_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            limit: config.limit,
            window: Duration::from_millis(config.window_ms),
            strategy: config.strategy,
            idle_timeout,
            windows: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count a request for `key`. The window is created on first sight and
    /// mutated under the map's shard guard, so reset-and-count is atomic.
    pub fn check(&self, key: &str) -> Decision {
        let now = Instant::now();
        if let Some(mut window) = self.windows.get_mut(key) {
            return window.try_acquire(self.limit, self.window, now);
        }
        self.windows
            .entry(key.to_string())
            .or_insert_with(|| RateLimitWindow::new(self.strategy, now))
            .try_acquire(self.limit, self.window, now)
    }

    pub fn allow(&self, key: &str) -> bool {
        self.check(key).is_allowed()
    }

    /// Drop windows idle for longer than the idle timeout (never less than
    /// one full window). Returns how many were dropped.
    pub fn purge_idle(&self) -> usize {
        let now = Instant::now();
        let keep_for = self.idle_timeout.max(self.window);
        let before = self.windows.len();
        self.windows.retain(|_, w| w.idle_for(now) < keep_for);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
