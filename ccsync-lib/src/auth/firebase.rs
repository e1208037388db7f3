//! Firebase Authentication over its REST API

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use log::debug;
use log::warn;
use tokio::sync::RwLock;
use tokio::sync::watch;

use super::AuthIdentity;
use super::AuthProvider;
use super::AuthState;
use super::FirebaseConfig;
use super::common::{RefreshResponse, SignInResponse, endpoint_url, expires_at, handle_response};
use crate::error::AuthError;
use crate::session::SubjectClaims;

/// Tokens held for the signed-in user.
#[derive(Debug, Clone)]
struct FirebaseTokens {
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl FirebaseTokens {
    fn expires_within(&self, buffer: std::time::Duration) -> bool {
        let buffer = chrono::Duration::from_std(buffer).unwrap_or(chrono::Duration::zero());
        Utc::now() + buffer >= self.expires_at
    }
}

/// An [`AuthProvider`] backed by Firebase Authentication.
///
/// Starts in [`AuthState::Unknown`]. The host either restores a persisted
/// refresh token with [`restore`](Self::restore), signs a user in with
/// [`sign_in_with_password`](Self::sign_in_with_password), or declares there is
/// nothing to restore with [`mark_signed_out`](Self::mark_signed_out).
///
/// # Example
///
/// ```ignore
/// use ccsync_lib::auth::{FirebaseAuth, FirebaseConfig};
///
/// let auth = FirebaseAuth::new(FirebaseConfig::from_env().unwrap());
/// let identity = auth.sign_in_with_password("officer@example.edu", "secret").await?;
/// let token = auth.fresh_token(false).await?;
/// ```
pub struct FirebaseAuth {
    config: FirebaseConfig,
    http_client: reqwest::Client,
    tokens: RwLock<Option<FirebaseTokens>>,
    state: watch::Sender<AuthState>,
}

impl FirebaseAuth {
    /// Creates a provider with a default HTTP client.
    pub fn new(config: FirebaseConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Creates a provider with a custom HTTP client.
    pub fn with_http_client(config: FirebaseConfig, http_client: reqwest::Client) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            config,
            http_client,
            tokens: RwLock::new(None),
            state,
        }
    }

    /// Signs in with email and password.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthIdentity, AuthError> {
        let url = endpoint_url(
            &self.config.identity_toolkit_url,
            "accounts:signInWithPassword",
            &self.config.api_key,
        )?;

        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self.http_client.post(url).json(&body).send().await?;
        let signed_in: SignInResponse = handle_response(response).await?;

        let identity = AuthIdentity {
            uid: signed_in.local_id,
            email: signed_in.email,
            display_name: signed_in.display_name.filter(|name| !name.is_empty()),
        };

        *self.tokens.write().await = Some(FirebaseTokens {
            id_token: signed_in.id_token,
            refresh_token: signed_in.refresh_token,
            expires_at: expires_at(signed_in.expires_in),
        });

        debug!("Signed in as {}", identity.uid);
        self.state.send_replace(AuthState::SignedIn(identity.clone()));
        Ok(identity)
    }

    /// Restores a session from a persisted refresh token.
    ///
    /// Broadcasts [`AuthState::SignedIn`] on success and [`AuthState::SignedOut`]
    /// on any failure.
    pub async fn restore(&self, refresh_token: &str) -> Result<AuthIdentity, AuthError> {
        match self.exchange(refresh_token).await {
            Ok((tokens, uid)) => {
                let claims = SubjectClaims::from_jwt(&tokens.id_token);
                let identity = AuthIdentity {
                    uid: uid
                        .or_else(|| claims.as_ref().and_then(|c| c.subject.clone()))
                        .unwrap_or_default(),
                    email: claims.as_ref().and_then(|c| c.email.clone()),
                    display_name: claims.and_then(|c| c.name),
                };
                *self.tokens.write().await = Some(tokens);

                debug!("Restored session for {}", identity.uid);
                self.state.send_replace(AuthState::SignedIn(identity.clone()));
                Ok(identity)
            }
            Err(e) => {
                warn!("Could not restore session: {}", e);
                self.mark_signed_out();
                Err(e)
            }
        }
    }

    /// Reports that there is no identity to restore.
    pub fn mark_signed_out(&self) {
        self.state.send_replace(AuthState::SignedOut);
    }

    /// The current refresh token, for hosts that persist it themselves.
    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|tokens| tokens.refresh_token.clone())
    }

    /// Exchanges a refresh token for new tokens.
    async fn exchange(&self, refresh_token: &str) -> Result<(FirebaseTokens, Option<String>), AuthError> {
        let url = endpoint_url(&self.config.secure_token_url, "token", &self.config.api_key)?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self.http_client.post(url).form(&params).send().await?;
        let refreshed: RefreshResponse = handle_response(response).await?;

        let tokens = FirebaseTokens {
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: expires_at(refreshed.expires_in),
        };
        Ok((tokens, refreshed.user_id))
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    async fn fresh_token(&self, force_refresh: bool) -> Result<String, AuthError> {
        let Some(current) = self.tokens.read().await.clone() else {
            return Err(AuthError::NotSignedIn);
        };

        if !force_refresh && !current.expires_within(self.config.expiry_buffer) {
            return Ok(current.id_token);
        }

        match self.exchange(&current.refresh_token).await {
            Ok((tokens, _)) => {
                let id_token = tokens.id_token.clone();
                *self.tokens.write().await = Some(tokens);
                Ok(id_token)
            }
            Err(e) => {
                if e.ends_session() {
                    warn!("Refresh token rejected, signing out: {}", e);
                    *self.tokens.write().await = None;
                    self.state.send_replace(AuthState::SignedOut);
                }
                Err(e)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.tokens.write().await = None;
        self.state.send_replace(AuthState::SignedOut);
        debug!("Signed out");
        Ok(())
    }
}
