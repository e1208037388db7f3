//! Session configuration

use std::time::Duration;

/// Configuration for a [`SessionCoordinator`](super::SessionCoordinator).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ccsync_lib::session::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_staleness_threshold(Duration::from_secs(30 * 60))
///     .with_key_prefix("officers");
/// assert_eq!(config.session_key, "officers.session");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// A cached credential older than this is refreshed before it is handed out.
    ///
    /// Default: 55 minutes
    pub staleness_threshold: Duration,

    /// Store key of the cached user record.
    ///
    /// Default: `ccsync.user`
    pub user_key: String,

    /// Store key of the cached session credential.
    ///
    /// Default: `ccsync.session`
    pub session_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            staleness_threshold: Duration::from_secs(55 * 60), // 55 minutes
            user_key: "ccsync.user".to_string(),
            session_key: "ccsync.session".to_string(),
        }
    }
}

impl SessionConfig {
    /// Creates a new session config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the staleness threshold.
    pub fn with_staleness_threshold(mut self, threshold: Duration) -> Self {
        self.staleness_threshold = threshold;
        self
    }

    /// Namespaces both store keys under `prefix`.
    pub fn with_key_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        let prefix = prefix.as_ref();
        self.user_key = format!("{}.user", prefix);
        self.session_key = format!("{}.session", prefix);
        self
    }
}
