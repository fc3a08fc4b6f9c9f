/**
 * SQLite Message Store
 *
 * Persists messages in a single `messages` table keyed by message id. The
 * full message is kept as a JSON `body` next to its `created_at` so the
 * stored value is exactly what the gateway confirmed.
 *
 * Schema changes live in `migrations/` and are applied on connect with
 * `sqlx::migrate!`.
 */
use super::{MessageStore, StoreError};
use crate::shared::Message;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Connections kept for a file-backed database
const MAX_CONNECTIONS: u32 = 5;

/// Message store backed by an SQLite database
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and run migrations
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use feedsync::backend::store::SqliteStore;
    ///
    /// # async fn example() {
    /// let store = SqliteStore::connect("sqlite://feed.db").await.unwrap();
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::unavailable(format!("invalid database URL: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database, gone when the store is dropped
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        // every connection to :memory: is its own database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        tracing::info!("[Store] Running database migrations...");
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StoreError::unavailable(format!("migration failed: {}", e)))?;
        tracing::info!("[Store] Database migrations completed successfully");
        Ok(Self { pool })
    }

    /// Close the pool; later calls fail with `StoreError::Unavailable`
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn put(&self, id: &str, message: &Message) -> Result<(), StoreError> {
        let body = serde_json::to_string(message)
            .map_err(|e| StoreError::unavailable(format!("failed to encode message: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, created_at, body)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET
                created_at = excluded.created_at,
                body = excluded.body
            "#,
        )
        .bind(id)
        .bind(message.created_at)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("[Store] Failed to save message {}: {:?}", id, e);
            StoreError::unavailable(e.to_string())
        })?;

        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Message>, StoreError> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT id, body FROM messages")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("[Store] Failed to load messages: {:?}", e);
                StoreError::unavailable(e.to_string())
            })?;

        rows.into_iter()
            .map(|(id, body)| {
                serde_json::from_str(&body).map_err(|e| StoreError::Corrupt {
                    id,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
