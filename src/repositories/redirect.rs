// src/repositories/redirect.rs - Data access
use async_trait::async_trait;
use log::debug;
use sqlx::SqlitePool;

#[cfg(test)]
use mockall::automock;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::RedirectEntry;

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RedirectStore: Send + Sync {
    /// Looks up the target stored under a short key
    ///
    /// ### Arguments
    /// * `key` - The short key, already normalized
    ///
    /// ### Returns
    /// * `Result<Option<String>>` - The stored target, or `None` if the key is unknown
    ///
    /// ### Errors
    /// * `RepositoryError::Database` - If the store cannot be read
    /// * `RepositoryError::InvalidData` - If the stored row cannot be decoded
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `target` under `key`
    ///
    /// Callers are expected to check for an existing mapping first. Two writers
    /// racing on the same fresh key are not serialized; the later write wins.
    ///
    /// ### Errors
    /// * `RepositoryError::Database` - If the write fails
    async fn put(&self, key: &str, target: &str) -> Result<()>;
}

// Implementation using the embedded database
pub struct RedirectRepository {
    pool: SqlitePool,
}

impl RedirectRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl RedirectStore for RedirectRepository {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let record = sqlx::query_as::<_, RedirectEntry>(
            "SELECT key, target FROM redirects WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to read redirect '{}': {}", key, e);
            RepositoryError::from(e)
        })?;

        Ok(record.map(|entry| entry.target))
    }

    async fn put(&self, key: &str, target: &str) -> Result<()> {
        sqlx::query(
            r#"
                INSERT INTO redirects (key, target)
                VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET target = excluded.target
            "#,
        )
        .bind(key)
        .bind(target)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to store redirect '{}': {}", key, e);
            RepositoryError::from(e)
        })?;

        debug!("Stored redirect '{}' -> '{}'", key, target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::DatabaseConfig;

    use super::*;

    #[tokio::test]
    async fn test_get_unknown_key_is_none() {
        let repo = RedirectRepository::new(Database::in_memory().await.unwrap());
        assert_eq!(repo.get("nothing-here").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let repo = RedirectRepository::new(Database::in_memory().await.unwrap());
        repo.put("docs", "https://docs.rs").await.unwrap();

        assert_eq!(
            repo.get("docs").await.unwrap().as_deref(),
            Some("https://docs.rs")
        );
        // Keys are matched exactly
        assert_eq!(repo.get("Docs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_only_key_and_target_are_stored() {
        let db = Database::in_memory().await.unwrap();
        let columns: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM pragma_table_info('redirects') ORDER BY cid")
                .fetch_all(db.get_pool())
                .await
                .unwrap();

        let columns: Vec<&str> = columns.iter().map(|(name,)| name.as_str()).collect();
        assert_eq!(columns, ["key", "target"]);
    }

    #[tokio::test]
    async fn test_redirects_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("sessions.db").display()),
            max_connections: 2,
            use_migrations: true,
            connect_timeout_seconds: 5,
            create_database_if_missing: true,
        };

        let db = Database::connect(&config).await.unwrap();
        RedirectRepository::new(db.clone())
            .put("keep", "http://example.com")
            .await
            .unwrap();
        db.shutdown().await;

        let reopened = RedirectRepository::new(Database::connect(&config).await.unwrap());
        assert_eq!(
            reopened.get("keep").await.unwrap().as_deref(),
            Some("http://example.com")
        );
    }

    #[tokio::test]
    async fn test_read_after_close_is_an_error() {
        let db = Database::in_memory().await.unwrap();
        let repo = RedirectRepository::new(db.clone());
        db.shutdown().await;

        assert!(matches!(
            repo.get("docs").await,
            Err(RepositoryError::Database(_))
        ));
    }
}
