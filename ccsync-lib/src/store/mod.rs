//! Credential persistence
//!
//! A `CredentialStore` is a plain string key-value store. The session
//! coordinator keeps its cached user and session records in one, serialized as
//! JSON. Browser hosts back it with local storage; native hosts use
//! [`SqliteStore`], tests use [`MemoryStore`].

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;

/// Trait for credential stores.
///
/// Reads and writes never fail from the caller's point of view: an
/// implementation that hits an I/O error logs it, and a failed read looks like a
/// missing key.
///
/// # Example
///
/// ```
/// use ccsync_lib::store::{CredentialStore, MemoryStore};
///
/// # async fn demo() {
/// let store = MemoryStore::new();
/// store.set("ccsync.session", "{}").await;
/// assert_eq!(store.get("ccsync.session").await.as_deref(), Some("{}"));
/// store.remove("ccsync.session").await;
/// assert!(store.get("ccsync.session").await.is_none());
/// # }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reads a value by key.
    async fn get(&self, key: &str) -> Option<String>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str);

    /// Deletes a value. Missing keys are ignored.
    async fn remove(&self, key: &str);
}
