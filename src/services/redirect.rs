use std::sync::Arc;

use tracing::trace;

use crate::admission::{AdmissionController, Route};
use crate::cache::ResolutionCache;
use crate::errors::{Result, SnaplinkError};
use crate::storage::OriginStore;
use crate::utils::is_valid_short_code;

/// Hot path: admission, then cache, then a single-flight origin read.
pub struct RedirectResolver {
    admission: Arc<AdmissionController>,
    cache: Arc<ResolutionCache>,
    store: Arc<dyn OriginStore>,
}

impl RedirectResolver {
    pub fn new(
        admission: Arc<AdmissionController>,
        cache: Arc<ResolutionCache>,
        store: Arc<dyn OriginStore>,
    ) -> Self {
        Self {
            admission,
            cache,
            store,
        }
    }

    /// Resolve `code` for `client` to its destination URL.
    ///
    /// Rate-limited requests fail before the cache is consulted. Codes that
    /// cannot exist are `NotFound` without a cache or store lookup.
    pub async fn resolve(&self, client: &str, code: &str) -> Result<Arc<str>> {
        self.admission.admit(Route::Redirect, client, Some(code))?;

        if !is_valid_short_code(code) {
            trace!("Rejecting malformed code without lookup: {}", code);
            return Err(SnaplinkError::not_found(format!(
                "Short code '{}' not found",
                code
            )));
        }

        match self.cache.get_or_load(code, &self.store).await? {
            Some(url) => {
                trace!("Resolved {} -> {}", code, url);
                Ok(url)
            }
            None => Err(SnaplinkError::not_found(format!(
                "Short code '{}' not found",
                code
            ))),
        }
    }
}
