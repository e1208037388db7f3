//! SessionCoordinator: hands out fresh credentials

use std::sync::Arc;
use std::sync::Mutex;

use log::debug;
use log::error;
use log::warn;
use tokio::task::JoinHandle;

use super::Clock;
use super::SessionConfig;
use super::SessionContext;
use super::SessionCredential;
use super::SessionState;
use super::SubjectClaims;
use super::SystemClock;
use crate::auth::AuthIdentity;
use crate::auth::AuthProvider;
use crate::auth::AuthState;
use crate::error::AuthError;
use crate::store::CredentialStore;

/// Coordinates the auth provider, the cached credential and logout.
///
/// Construct one per process and share it (`Arc<SessionCoordinator>`) with every
/// page that needs a session. Every call to
/// [`current_session`](Self::current_session) waits for the provider's current
/// auth state, re-checks the logout flag, and refreshes the cached credential if
/// it is older than the staleness threshold.
///
/// Concurrent callers are not collapsed: two calls during a stale window each
/// trigger a refresh.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use ccsync_lib::auth::{FirebaseAuth, FirebaseConfig};
/// use ccsync_lib::session::SessionCoordinator;
/// use ccsync_lib::store::SqliteStore;
///
/// let auth = Arc::new(FirebaseAuth::new(FirebaseConfig::from_env().unwrap()));
/// let store = Arc::new(SqliteStore::open("ccsync.db").await?);
/// let sessions = Arc::new(SessionCoordinator::new(auth, store));
/// sessions.spawn_listener();
///
/// match sessions.current_session().await {
///     Some(credential) => render_dashboard(&credential),
///     None => redirect_to_sign_in(),
/// }
/// ```
pub struct SessionCoordinator {
    provider: Arc<dyn AuthProvider>,
    store: Arc<dyn CredentialStore>,
    context: Arc<SessionContext>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionCoordinator {
    /// Creates a coordinator with default configuration and a fresh context.
    pub fn new(provider: Arc<dyn AuthProvider>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            provider,
            store,
            context: Arc::new(SessionContext::new()),
            clock: Arc::new(SystemClock),
            config: SessionConfig::default(),
            listener: Mutex::new(None),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing context.
    pub fn with_context(mut self, context: Arc<SessionContext>) -> Self {
        self.context = context;
        self
    }

    /// Sets the clock used for staleness checks and issue times.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The state observed from the latest notification or session request.
    pub fn state(&self) -> SessionState {
        self.context.state()
    }

    // -------------------------------------------------------------------------
    // Session access
    // -------------------------------------------------------------------------

    /// Returns the current session, refreshing a stale credential first.
    ///
    /// Resolves to `None` when nobody is signed in, a logout is in progress, the
    /// provider goes away, or the refresh fails. Callers treat `None` as "not
    /// authenticated" and send the user to sign in.
    pub async fn current_session(&self) -> Option<SessionCredential> {
        let mut rx = self.provider.subscribe();
        let state = match rx.wait_for(AuthState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => {
                warn!("Auth provider closed before reporting a state");
                return None;
            }
        };
        drop(rx);

        // The flag is read here, after the wait, so a logout that started while
        // this call was suspended is observed.
        let identity = match state {
            AuthState::SignedIn(identity) if !self.context.logout_in_progress() => identity,
            AuthState::SignedIn(identity) => {
                debug!("Ignoring session for {} while logout is in progress", identity.uid);
                self.apply_signed_out(false).await;
                return None;
            }
            _ => {
                self.apply_signed_out(true).await;
                return None;
            }
        };

        let cached = self.load_credential().await;
        match cached {
            Some(credential) if !self.needs_refresh(&credential, &identity) => {
                self.context.set_state(SessionState::SignedInFresh);
                Some(credential)
            }
            cached => {
                self.context.set_state(SessionState::SignedInStale);
                self.refresh(&identity, cached).await
            }
        }
    }

    /// Applies one auth state notification to the session state.
    pub async fn handle_auth_state(&self, state: &AuthState) {
        match state {
            AuthState::Unknown => self.context.set_state(SessionState::Unknown),
            AuthState::SignedOut => self.apply_signed_out(true).await,
            AuthState::SignedIn(identity) if self.context.logout_in_progress() => {
                debug!("Ignoring sign-in of {} while logout is in progress", identity.uid);
                self.apply_signed_out(false).await;
            }
            AuthState::SignedIn(identity) => {
                self.save_user(identity).await;
                let stale = match self.load_credential().await {
                    Some(credential) => self.needs_refresh(&credential, identity),
                    None => true,
                };
                self.context.set_state(if stale {
                    SessionState::SignedInStale
                } else {
                    SessionState::SignedInFresh
                });
            }
        }
    }

    /// Subscribes to the provider and applies every notification in the background.
    ///
    /// Replaces a previously spawned listener. Must be called within a Tokio runtime.
    pub fn spawn_listener(self: &Arc<Self>) {
        let mut rx = self.provider.subscribe();
        let coordinator = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            loop {
                let state = rx.borrow_and_update().clone();
                let Some(this) = coordinator.upgrade() else {
                    break;
                };
                this.handle_auth_state(&state).await;
                drop(this);

                if rx.changed().await.is_err() {
                    debug!("Auth provider closed, stopping listener");
                    break;
                }
            }
        });

        if let Some(previous) = self.replace_listener(Some(handle)) {
            previous.abort();
        }
    }

    /// Signs the user out.
    ///
    /// Sets the logout flag, clears cached records, then asks the provider to sign
    /// out and stops the listener. The flag is settled as soon as the provider
    /// reports the sign-out.
    ///
    /// If the provider fails, the flag is settled straight away and the session
    /// state follows the provider again, so the user stays signed in.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.context.begin_logout();
        self.clear_records().await;
        self.context.set_state(SessionState::SignedOut);

        if let Err(e) = self.provider.sign_out().await {
            warn!("Sign-out failed, keeping the current session: {}", e);
            self.context.settle_logout();
            let current = self.provider.subscribe().borrow().clone();
            self.handle_auth_state(&current).await;
            return Err(e);
        }

        if let Some(listener) = self.replace_listener(None) {
            listener.abort();
        }

        let settled = matches!(*self.provider.subscribe().borrow(), AuthState::SignedOut);
        if settled {
            self.context.settle_logout();
        }
        debug!("Signed out (settled: {})", settled);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn needs_refresh(&self, credential: &SessionCredential, identity: &AuthIdentity) -> bool {
        credential.is_stale(self.clock.now(), self.config.staleness_threshold)
            || !credential.belongs_to(&identity.uid)
    }

    /// One refresh attempt. Failures are logged and fold into `None`.
    async fn refresh(
        &self,
        identity: &AuthIdentity,
        cached: Option<SessionCredential>,
    ) -> Option<SessionCredential> {
        debug!("Refreshing session for {}", identity.uid);

        let token = match self.provider.fresh_token(true).await {
            Ok(token) => token,
            Err(e) => {
                error!("Token refresh failed for {}: {}", identity.uid, e);
                return None;
            }
        };

        if self.context.logout_in_progress() {
            debug!("Logout started during refresh, discarding token");
            return None;
        }

        let claims = SubjectClaims::from_jwt(&token)
            .or_else(|| {
                cached
                    .filter(|credential| credential.belongs_to(&identity.uid))
                    .map(|credential| credential.claims)
            })
            .unwrap_or_else(|| SubjectClaims::from_identity(identity));

        let credential = SessionCredential {
            raw_token: token,
            last_issued_at: self.clock.now(),
            claims,
        };
        self.save_credential(&credential).await;
        self.context.set_state(SessionState::SignedInFresh);
        Some(credential)
    }

    async fn apply_signed_out(&self, settled: bool) {
        if settled {
            self.context.settle_logout();
        }
        self.clear_records().await;
        self.context.set_state(SessionState::SignedOut);
    }

    async fn load_credential(&self) -> Option<SessionCredential> {
        let raw = self.store.get(&self.config.session_key).await?;
        match serde_json::from_str(&raw) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!("Discarding unreadable session record: {}", e);
                None
            }
        }
    }

    async fn save_credential(&self, credential: &SessionCredential) {
        match serde_json::to_string(credential) {
            Ok(raw) => self.store.set(&self.config.session_key, &raw).await,
            Err(e) => warn!("Could not serialize session record: {}", e),
        }
    }

    async fn save_user(&self, identity: &AuthIdentity) {
        match serde_json::to_string(identity) {
            Ok(raw) => self.store.set(&self.config.user_key, &raw).await,
            Err(e) => warn!("Could not serialize user record: {}", e),
        }
    }

    async fn clear_records(&self) {
        self.store.remove(&self.config.user_key).await;
        self.store.remove(&self.config.session_key).await;
    }

    fn replace_listener(&self, handle: Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        match self.listener.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, handle),
            Err(_) => handle,
        }
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.listener.lock()
            && let Some(listener) = guard.take()
        {
            listener.abort();
        }
    }
}
