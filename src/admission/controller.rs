use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::limiter::KeyedLimiter;
use super::window::Decision;
use crate::config::{RateLimitConfig, RoutePolicyConfig};
use crate::errors::{Result, SnaplinkError};

/// Endpoints with their own admission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Redirect,
    Create,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Redirect => "redirect",
            Route::Create => "create",
        }
    }
}

/// Limiters composed for one route, checked per client, then per code,
/// then globally. A request rejected by a later limiter has still been
/// counted by the earlier ones.
#[derive(Default)]
pub struct RoutePolicy {
    per_client: Option<KeyedLimiter>,
    per_code: Option<KeyedLimiter>,
    global: Option<KeyedLimiter>,
}

impl RoutePolicy {
    fn from_config(route: Route, config: &RoutePolicyConfig, idle_timeout: Duration) -> Self {
        let build = |scope: &str, limit: &Option<crate::config::LimitConfig>| {
            limit.as_ref().map(|l| {
                KeyedLimiter::new(format!("{}.{}", route.as_str(), scope), l, idle_timeout)
            })
        };
        Self {
            per_client: build("per_client", &config.per_client),
            per_code: build("per_code", &config.per_code),
            global: build("global", &config.global),
        }
    }

    fn limiters(&self) -> impl Iterator<Item = &KeyedLimiter> {
        [&self.per_client, &self.per_code, &self.global]
            .into_iter()
            .flatten()
    }
}

/// Rejects excess requests before they reach the cache or the origin store.
pub struct AdmissionController {
    enabled: bool,
    redirect: RoutePolicy,
    create: RoutePolicy,
}

impl AdmissionController {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let idle_timeout = Duration::from_millis(config.idle_timeout_ms);
        Self {
            enabled: config.enabled,
            redirect: RoutePolicy::from_config(Route::Redirect, &config.redirect, idle_timeout),
            create: RoutePolicy::from_config(Route::Create, &config.create, idle_timeout),
        }
    }

    /// Admits everything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            redirect: RoutePolicy::default(),
            create: RoutePolicy::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn policy(&self, route: Route) -> &RoutePolicy {
        match route {
            Route::Redirect => &self.redirect,
            Route::Create => &self.create,
        }
    }

    /// Check every limiter of `route`. `code` is the short code the request
    /// targets, when it names one.
    pub fn admit(&self, route: Route, client: &str, code: Option<&str>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let policy = self.policy(route);

        let checks = [
            (policy.per_client.as_ref(), Some(client)),
            (policy.per_code.as_ref(), code),
            (policy.global.as_ref(), Some("*")),
        ];
        for (limiter, key) in checks {
            let (Some(limiter), Some(key)) = (limiter, key) else {
                continue;
            };
            if let Decision::Limited { retry_after } = limiter.check(key) {
                warn!(
                    "Rate limit exceeded: limiter={}, key={}, retry_after={}ms",
                    limiter.name(),
                    key,
                    retry_after.as_millis()
                );
                return Err(SnaplinkError::rate_limited(
                    "Too many requests, please try again later.",
                    retry_after.as_millis() as u64,
                ));
            }
        }
        Ok(())
    }

    /// Drop idle windows across all limiters.
    pub fn purge_idle(&self) -> usize {
        self.redirect
            .limiters()
            .chain(self.create.limiters())
            .map(KeyedLimiter::purge_idle)
            .sum()
    }

    /// Periodically purge idle windows until the handle is aborted.
    pub fn spawn_janitor(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = controller.purge_idle();
                if purged > 0 {
                    debug!("Admission janitor dropped {} idle windows", purged);
                }
            }
        })
    }
}
