//! AuthProvider trait and the auth state it broadcasts

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::AuthError;

/// The signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    /// Provider user id.
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl AuthIdentity {
    /// Creates an identity with just a user id.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// What the provider currently knows about the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Startup: the provider has not restored a persisted identity yet.
    #[default]
    Unknown,
    /// No user is signed in.
    SignedOut,
    /// A user is signed in.
    SignedIn(AuthIdentity),
}

impl AuthState {
    /// Returns `true` once the provider has reported either outcome.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&AuthIdentity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Boundary to a third-party authentication service.
///
/// Implementors own the user's long-lived credentials and broadcast every auth
/// state change (sign-in, sign-out, restored identity at startup) through a
/// [`watch`] channel. A new subscriber sees the current state immediately, which
/// is how callers wait for "the next auth state notification".
///
/// # Example
///
/// ```ignore
/// let mut rx = provider.subscribe();
/// let state = rx.wait_for(AuthState::is_settled).await?.clone();
/// if state.identity().is_some() {
///     let token = provider.fresh_token(false).await?;
/// }
/// ```
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Subscribes to auth state changes. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> watch::Receiver<AuthState>;

    /// Returns an ID token for the signed-in user.
    ///
    /// With `force_refresh` the provider must mint a new token even if its
    /// cached one is still valid.
    async fn fresh_token(&self, force_refresh: bool) -> Result<String, AuthError>;

    /// Signs the user out and broadcasts [`AuthState::SignedOut`].
    async fn sign_out(&self) -> Result<(), AuthError>;
}
