use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use log::{debug, info};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};

/// Per-IP creation counter with a global fixed window.
///
/// Every IP starts each window at zero. The whole map is dropped on reset, so
/// all counts return to zero at the same moment no matter when each IP last
/// created a link.
pub struct RateLimiter {
    max_rate: u32,
    rates: RwLock<HashMap<String, u32>>,
}

impl RateLimiter {
    pub fn new(max_rate: u32) -> Self {
        Self {
            max_rate,
            rates: RwLock::new(HashMap::new()),
        }
    }

    pub fn max_rate(&self) -> u32 {
        self.max_rate
    }

    /// Counts one creation for `ip`. Returns `false`, leaving the count
    /// untouched, once the IP has used up its allowance for this window.
    pub fn try_consume(&self, ip: &str) -> bool {
        let mut rates = self.rates.write().unwrap_or_else(PoisonError::into_inner);
        let count = rates.entry(ip.to_string()).or_insert(0);
        if *count >= self.max_rate {
            debug!("Rate limit reached for {} ({}/{})", ip, count, self.max_rate);
            return false;
        }

        *count += 1;
        true
    }

    /// Creations counted for `ip` in the current window
    pub fn count(&self, ip: &str) -> u32 {
        self.rates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ip)
            .copied()
            .unwrap_or(0)
    }

    /// Replaces the whole map with an empty one
    pub fn reset(&self) {
        let mut rates = self.rates.write().unwrap_or_else(PoisonError::into_inner);
        let tracked = rates.len();
        *rates = HashMap::new();
        debug!("Rate limits reset, {} addresses cleared", tracked);
    }

    /// Starts the background task clearing all counts every `period`.
    /// The first reset happens one full period after the call.
    pub fn spawn_periodic_reset(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        info!("Rate limits reset every {}s", period.as_secs());

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                limiter.reset();
            }
        })
    }
}
