use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::WindowStrategy;

/// Outcome of one admission check against one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

#[derive(Debug)]
enum WindowState {
    Fixed { count: u32, window_start: Instant },
    Sliding { hits: VecDeque<Instant> },
}

/// Counter state for one tracked key.
#[derive(Debug)]
pub struct RateLimitWindow {
    state: WindowState,
    last_seen: Instant,
}

impl RateLimitWindow {
    pub fn new(strategy: WindowStrategy, now: Instant) -> Self {
        let state = match strategy {
            WindowStrategy::FixedWindow => WindowState::Fixed {
                count: 0,
                window_start: now,
            },
            WindowStrategy::SlidingLog => WindowState::Sliding {
                hits: VecDeque::new(),
            },
        };
        Self {
            state,
            last_seen: now,
        }
    }

    /// Count one request at `now` if the key still has quota.
    ///
    /// A request landing exactly on `window_start + window` opens a new
    /// window. Rejected requests are not counted.
    pub fn try_acquire(&mut self, limit: u32, window: Duration, now: Instant) -> Decision {
        self.last_seen = now;
        match &mut self.state {
            WindowState::Fixed {
                count,
                window_start,
            } => {
                if now >= *window_start + window {
                    *window_start = now;
                    *count = 0;
                }
                if *count < limit {
                    *count += 1;
                    Decision::Allowed {
                        remaining: limit - *count,
                    }
                } else {
                    Decision::Limited {
                        retry_after: (*window_start + window).saturating_duration_since(now),
                    }
                }
            }
            WindowState::Sliding { hits } => {
                while let Some(oldest) = hits.front() {
                    if now.saturating_duration_since(*oldest) >= window {
                        hits.pop_front();
                    } else {
                        break;
                    }
                }
                let used = hits.len() as u32;
                if used < limit {
                    hits.push_back(now);
                    Decision::Allowed {
                        remaining: limit - used - 1,
                    }
                } else {
                    let retry_after = hits
                        .front()
                        .map(|oldest| (*oldest + window).saturating_duration_since(now))
                        .unwrap_or(window);
                    Decision::Limited { retry_after }
                }
            }
        }
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }
}
