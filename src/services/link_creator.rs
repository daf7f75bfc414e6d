// src/services/link_creator.rs - Business logic
use std::sync::Arc;

use log::{info, warn};

use crate::errors::CreationError;
use crate::repositories::RedirectStore;
use crate::services::{AnalyticsTracker, RateLimiter};
use crate::utils::text::escape_key;
use crate::validations::{sanitize_key, validate_target, with_default_scheme};

type Result<T> = std::result::Result<T, CreationError>;

pub struct LinkCreator<T: RedirectStore> {
    repository: Arc<T>,
    rate_limiter: Arc<RateLimiter>,
    analytics: Arc<AnalyticsTracker>,
    base_url: String,
}

impl<T: RedirectStore> LinkCreator<T> {
    pub fn new(
        repository: Arc<T>,
        rate_limiter: Arc<RateLimiter>,
        analytics: Arc<AnalyticsTracker>,
        base_url: String,
    ) -> Self {
        Self {
            repository,
            rate_limiter,
            analytics,
            base_url,
        }
    }

    /// Stores a new redirect on behalf of `requester_ip` and returns its short URL.
    ///
    /// The checks run in a fixed order and the first failing one decides the
    /// error. The requester's allowance is only spent once the key and the
    /// target have both been accepted.
    pub async fn create(&self, raw_key: &str, target: &str, requester_ip: &str) -> Result<String> {
        let key = sanitize_key(raw_key);

        if key.is_empty() || target.is_empty() {
            return Err(CreationError::MissingParameters);
        }

        // Not atomic with the write below: two creates racing on the same
        // fresh key can both get through, and the later one wins.
        if self.is_taken(&key).await {
            return Err(CreationError::KeyTaken);
        }

        let target = with_default_scheme(target);
        if validate_target(&target).is_err() {
            return Err(CreationError::InvalidUrl);
        }

        if !self.rate_limiter.try_consume(requester_ip) {
            info!(
                "Rejected creation of '{}' from {}: {} creations this window",
                key,
                requester_ip,
                self.rate_limiter.count(requester_ip)
            );
            return Err(CreationError::RateLimitExceeded {
                limit: self.rate_limiter.max_rate(),
            });
        }

        self.analytics.record_creation();

        self.repository
            .put(&key, &target)
            .await
            .map_err(|_| CreationError::StorageFailure)?;

        info!("Created redirect '{}' -> '{}'", key, target);
        Ok(format!("{}{}", self.base_url, escape_key(&key)))
    }

    async fn is_taken(&self, key: &str) -> bool {
        match self.repository.get(key).await {
            Ok(existing) => existing.is_some_and(|target| !target.is_empty()),
            Err(e) => {
                warn!("Could not check whether '{}' is taken: {}", key, e);
                false
            }
        }
    }
}
