// src/services/redirect.rs - Key lookups
use std::sync::Arc;

use log::{debug, warn};

use crate::repositories::RedirectStore;
use crate::services::AnalyticsTracker;

/// Turns short keys back into targets. A miss is a normal outcome and
/// resolves to the base URL rather than an error.
pub struct RedirectResolver<T: RedirectStore> {
    repository: Arc<T>,
    analytics: Arc<AnalyticsTracker>,
    base_url: String,
}

impl<T: RedirectStore> RedirectResolver<T> {
    pub fn new(repository: Arc<T>, analytics: Arc<AnalyticsTracker>, base_url: String) -> Self {
        Self {
            repository,
            analytics,
            base_url,
        }
    }

    /// Where a visitor of `/{key}` should be sent
    pub async fn resolve(&self, key: &str) -> String {
        match self.find_target(key).await {
            Some(target) => {
                self.analytics.record_redirect();
                debug!("Redirecting '{}' to '{}'", key, target);
                target
            }
            None => {
                debug!("No redirect for '{}', falling back to {}", key, self.base_url);
                self.base_url.clone()
            }
        }
    }

    /// Side-effect free check of a short URL (or a bare key)
    pub async fn lookup(&self, input: &str) -> Option<String> {
        let key = input.replacen(&self.base_url, "", 1);
        self.find_target(&key).await
    }

    // Read failures fail open: they look exactly like an unknown key
    async fn find_target(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }

        match self.repository.get(key).await {
            Ok(Some(target)) if !target.is_empty() => Some(target),
            Ok(_) => None,
            Err(e) => {
                warn!("Lookup of '{}' failed, treating as missing: {}", key, e);
                None
            }
        }
    }
}
