use std::{sync::Arc, time::Duration, time::Instant};

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{debug, info};

use crate::{
    config::{Config, Environment},
    db::Database,
    errors::AppError,
    middleware::RequestLogger,
    routes,
    services::{self, AnalyticsTracker, RateLimiter},
    types::AppState,
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> Result<(), AppError> {
    // Configure log level based on environment and config
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info,sqlx=warn".to_string(),
        Environment::Production => "info,actix_web=warn,sqlx=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

pub async fn server() -> AppResult<()> {
    // Load application configuration
    let config = Config::load()?;

    // Setup enhanced logging based on configuration
    setup_logging(&config)?;

    // Capture start time for uptime calculation
    let start_time = Instant::now();

    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    info!(
        "Binding to {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );

    if config.app.environment == Environment::Development {
        debug!("Debug logging enabled");
        debug!("Full configuration: {:?}", config);
    }

    // Open the redirect store, the service is useless without it
    let db = Database::connect(&config.db).await?;

    // Process-wide counters shared by every worker
    let rate_limiter = Arc::new(RateLimiter::new(config.shortener.max_rate));
    let analytics = Arc::new(AnalyticsTracker::new(config.shortener.analytics_window()?));
    let reset_task = rate_limiter.spawn_periodic_reset(config.shortener.rate_reset_period()?);

    let enable_debug_logging = config.app.environment != Environment::Production;

    // Determine log format based on environment
    let log_format = if enable_debug_logging {
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\""
    } else {
        "%a \"%r\" %s %b %T"
    };

    let state = web::Data::new(AppState {
        start_time,
        db: db.clone(),
        version: config.app.version.clone(),
        analytics: analytics.clone(),
        admin_key: config.shortener.admin_key.clone(),
        site_title: config.shortener.site_title.clone(),
        site_header: config.shortener.site_header.clone(),
        base_url: config.shortener.base_url.clone(),
        behind_proxy: config.server.behind_proxy,
    });
    let app_db = db.clone();
    let base_url = config.shortener.base_url.clone();

    // Start the HTTP server
    let result = HttpServer::new(move || {
        let db = app_db.clone();
        let rate_limiter = rate_limiter.clone();
        let analytics = analytics.clone();
        let base_url = base_url.clone();

        App::new()
            .app_data(state.clone())
            .wrap(RequestLogger::new(enable_debug_logging))
            .wrap(Logger::new(log_format))
            .configure(move |cfg| services::register(db, rate_limiter, analytics, &base_url, cfg))
            .configure(routes::configure_routes)
    })
    .workers(config.server.workers)
    .client_request_timeout(Duration::from_secs(config.server.read_timeout_seconds))
    .bind((config.server.host.to_string(), config.server.port))?
    .run()
    .await;

    reset_task.abort();
    db.shutdown().await;

    result.map_err(AppError::from)
}
