//! Firebase configuration

use std::env;
use std::time::Duration;

/// Endpoints and keys for the Firebase Authentication REST API.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ccsync_lib::auth::FirebaseConfig;
///
/// let config = FirebaseConfig::new("web-api-key")
///     .with_expiry_buffer(Duration::from_secs(120));
/// ```
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key of the Firebase project.
    pub api_key: String,

    /// Identity Toolkit base URL (password sign-in).
    ///
    /// Default: `https://identitytoolkit.googleapis.com/v1`
    pub identity_toolkit_url: String,

    /// Secure Token base URL (refresh token exchange).
    ///
    /// Default: `https://securetoken.googleapis.com/v1`
    pub secure_token_url: String,

    /// Unforced token requests refresh this long before the ID token expires.
    ///
    /// Default: 5 minutes
    pub expiry_buffer: Duration,
}

impl FirebaseConfig {
    /// Environment variable holding the web API key.
    pub const API_KEY_VAR: &'static str = "CCSYNC_FIREBASE_API_KEY";

    /// Creates a config for the production endpoints.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            identity_toolkit_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            secure_token_url: "https://securetoken.googleapis.com/v1".to_string(),
            expiry_buffer: Duration::from_secs(300), // 5 minutes
        }
    }

    /// Reads the API key from `CCSYNC_FIREBASE_API_KEY`.
    pub fn from_env() -> Option<Self> {
        env::var(Self::API_KEY_VAR)
            .ok()
            .filter(|key| !key.is_empty())
            .map(Self::new)
    }

    /// Points both endpoints at one host, e.g. the Firebase Auth emulator.
    pub fn with_base_url(mut self, base: impl AsRef<str>) -> Self {
        let base = base.as_ref().trim_end_matches('/');
        self.identity_toolkit_url = format!("{}/identitytoolkit.googleapis.com/v1", base);
        self.secure_token_url = format!("{}/securetoken.googleapis.com/v1", base);
        self
    }

    /// Sets the Identity Toolkit base URL.
    pub fn with_identity_toolkit_url(mut self, url: impl Into<String>) -> Self {
        self.identity_toolkit_url = url.into();
        self
    }

    /// Sets the Secure Token base URL.
    pub fn with_secure_token_url(mut self, url: impl Into<String>) -> Self {
        self.secure_token_url = url.into();
        self
    }

    /// Sets the expiry buffer.
    pub fn with_expiry_buffer(mut self, buffer: Duration) -> Self {
        self.expiry_buffer = buffer;
        self
    }
}
