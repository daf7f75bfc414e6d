use std::{sync::Arc, time::Instant};

use serde::{Deserialize, Serialize};

use crate::{
    db::{Database, DatabaseHealth},
    errors::AppError,
    services::AnalyticsTracker,
};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub db_health: Option<DatabaseHealth>,
    pub uptime_seconds: u64,
}

// Define an AppState struct to hold shared application state
pub struct AppState {
    pub start_time: Instant,
    pub db: Database,
    pub version: String,
    pub analytics: Arc<AnalyticsTracker>,
    pub admin_key: String,
    pub site_title: String,
    pub site_header: String,
    pub base_url: String,
    pub behind_proxy: bool,
}
