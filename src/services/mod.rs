use std::sync::Arc;

use actix_web::web;

mod analytics;
mod link_creator;
mod rate_limiter;
mod redirect;

pub use analytics::AnalyticsTracker;
pub use link_creator::LinkCreator;
pub use rate_limiter::RateLimiter;
pub use redirect::RedirectResolver;

use crate::{db::Database, repositories::RedirectRepository};

/// Service Register
pub fn register(
    db: Database,
    rate_limiter: Arc<RateLimiter>,
    analytics: Arc<AnalyticsTracker>,
    base_url: &str,
    cfg: &mut web::ServiceConfig,
) {
    // create repository
    let redirect_repository = Arc::new(RedirectRepository::new(db));

    let link_creator = LinkCreator::new(
        redirect_repository.clone(),
        rate_limiter,
        analytics.clone(),
        base_url.to_string(),
    );
    let redirect_resolver =
        RedirectResolver::new(redirect_repository, analytics, base_url.to_string());

    cfg.app_data(web::Data::new(link_creator));
    cfg.app_data(web::Data::new(redirect_resolver));
}
