//! SQLite-backed persistent credential store.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_sqlite::rusqlite::OptionalExtension;
use async_trait::async_trait;
use chrono::Utc;
use log::warn;

use super::CredentialStore;
use crate::error::StoreError;

/// A persistent store backed by SQLite.
///
/// Records survive process restarts, so a desktop host can keep a user signed in
/// across launches. Uses WAL journal mode.
///
/// # Example
///
/// ```ignore
/// use ccsync_lib::store::SqliteStore;
///
/// let store = SqliteStore::open("ccsync.db").await?;
/// ```
pub struct SqliteStore {
    client: Client,
}

impl SqliteStore {
    /// Opens a store at the specified path, creating the file and table if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory store. Data is lost when the store is dropped.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    async fn init_schema(client: &Client) -> Result<(), async_sqlite::Error> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS credentials (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL,
                        updated_at INTEGER NOT NULL
                    )",
                    [],
                )?;
                Ok(())
            })
            .await
    }

    /// Returns the number of stored keys.
    pub async fn len(&self) -> Result<usize, StoreError> {
        let count = self
            .client
            .conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM credentials", [], |row| {
                    row.get::<_, i64>(0)
                })
            })
            .await?;
        Ok(count as usize)
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().await.map(|len| len == 0)
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn get(&self, key: &str) -> Option<String> {
        let key = key.to_string();

        let result = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT value FROM credentials WHERE key = ?",
                    [key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await;

        match result {
            Ok(value) => value,
            Err(e) => {
                warn!("Credential store read failed: {}", e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) {
        let key = key.to_string();
        let value = value.to_string();
        let updated_at = Utc::now().timestamp();

        let result = self
            .client
            .conn(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO credentials (key, value, updated_at) VALUES (?, ?, ?)",
                    rusqlite::params![key, value, updated_at],
                )
            })
            .await;

        if let Err(e) = result {
            warn!("Credential store write failed: {}", e);
        }
    }

    async fn remove(&self, key: &str) {
        let key = key.to_string();

        let result = self
            .client
            .conn(move |conn| conn.execute("DELETE FROM credentials WHERE key = ?", [key]))
            .await;

        if let Err(e) = result {
            warn!("Credential store delete failed: {}", e);
        }
    }
}
