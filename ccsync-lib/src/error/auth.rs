//! Authentication error types

/// Errors reported by an auth provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The refresh token was rejected; the user must sign in again.
    #[error("Token expired and refresh failed: {message}")]
    TokenExpired { message: String },

    /// The account has been disabled by an administrator.
    #[error("User account is disabled")]
    UserDisabled,

    /// A token was requested while no user is signed in.
    #[error("No user is signed in")]
    NotSignedIn,

    /// Network error during authentication.
    #[error("Network error during auth: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse authentication response.
    #[error("Auth response parse error: {0}")]
    Parse(String),

    /// Any other error code returned by the provider.
    #[error("Auth provider error {code}: {message}")]
    Provider { code: String, message: String },
}

impl AuthError {
    /// Returns `true` if the error means the stored identity is no longer usable.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            Self::TokenExpired { .. } | Self::UserDisabled | Self::NotSignedIn
        )
    }
}
