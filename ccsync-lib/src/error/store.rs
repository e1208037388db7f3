//! Credential store error types

/// Errors opening or preparing a credential store.
///
/// Reads and writes on an open store do not fail: see
/// [`CredentialStore`](crate::store::CredentialStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite failure.
    #[error("SQLite store error: {0}")]
    Sqlite(#[from] async_sqlite::Error),
}
