use std::{str::FromStr, time::Duration};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

pub type DbResult<T> = Result<T, DatabaseError>;

/// Represents an open handle on the embedded redirect store
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

/// Database health status
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DBHealthStatus {
    Healthy,
    Unhealthy,
}

/// Database information
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DbInfo {
    pub engine: String,
    pub version: Option<String>,
}

/// Complete database health check result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseHealth {
    pub status: DBHealthStatus,
    pub response_time_ms: u64,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_info: Option<DbInfo>,
}

impl Database {
    /// Open the store described by the configuration
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Opening redirect store");
        debug!(
            "Database configuration: max_conn={}, timeout={}s, create_if_missing={}",
            config.max_connections, config.connect_timeout_seconds, config.create_database_if_missing
        );

        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(config.create_database_if_missing);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Failed to open database: {}", e);
                DatabaseError::ConnectionError(e)
            })?;

        info!("Successfully opened redirect store");

        // Run migrations if enabled
        if config.use_migrations {
            Self::run_migrations(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Private in-memory store, one connection so every query sees the same data
    #[cfg(test)]
    pub async fn in_memory() -> DbResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the store answers queries
    pub async fn health_check(&self) -> DbResult<DatabaseHealth> {
        // Measure query execution time
        let start = std::time::Instant::now();

        let result: Result<(String,), sqlx::Error> = sqlx::query_as("SELECT sqlite_version()")
            .fetch_one(self.get_pool())
            .await;

        let elapsed = start.elapsed();

        match result {
            Ok((version,)) => Ok(DatabaseHealth {
                status: DBHealthStatus::Healthy,
                response_time_ms: elapsed.as_millis() as u64,
                message: None,
                db_info: Some(DbInfo {
                    engine: "sqlite".to_string(),
                    version: Some(version),
                }),
            }),
            Err(e) => Ok(DatabaseHealth {
                status: DBHealthStatus::Unhealthy,
                response_time_ms: elapsed.as_millis() as u64,
                message: Some(format!("Database query failed: {}", e)),
                db_info: None,
            }),
        }
    }

    /// Run database migrations
    async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
        info!("Running database migrations");

        match sqlx::migrate!("./migrations").run(pool).await {
            Ok(_) => {
                info!("Database migrations completed successfully");
                Ok(())
            }
            Err(e) => {
                warn!("Database migration error: {}", e);
                Err(DatabaseError::MigrationError(e.to_string()))
            }
        }
    }

    /// Gracefully close the connection pool
    pub async fn shutdown(&self) {
        log::info!("Shutting down database connection pool...");

        // Get current connection count for reporting
        let used_connections = self.pool.size();
        let idle_connections = self.pool.num_idle();

        self.pool.close().await;

        log::info!(
            "Database connection pool successfully closed. Stats: {} active, {} idle connections released",
            used_connections,
            idle_connections
        );
    }
}
