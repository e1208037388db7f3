//! Process-wide session state

use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// Where the coordinator believes the session stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No auth state notification seen yet.
    #[default]
    Unknown,
    SignedOut,
    /// Signed in with a credential younger than the staleness threshold.
    SignedInFresh,
    /// Signed in, but the credential must be refreshed before use.
    SignedInStale,
}

/// Shared mutable session state.
///
/// Holds the logout-in-progress flag and the observed [`SessionState`]. One
/// context is created per process and shared by everything that talks to the
/// session, so a logout started anywhere is seen by every pending
/// [`current_session`](super::SessionCoordinator::current_session) call.
#[derive(Debug, Default)]
pub struct SessionContext {
    logout_in_progress: AtomicBool,
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags that a logout has started.
    ///
    /// Until the flag is settled, any signed-in notification is treated as
    /// signed out.
    pub fn begin_logout(&self) {
        self.logout_in_progress.store(true, Ordering::SeqCst);
    }

    /// Clears the logout flag once the provider has reported the sign-out.
    pub fn settle_logout(&self) {
        self.logout_in_progress.store(false, Ordering::SeqCst);
    }

    pub fn logout_in_progress(&self) -> bool {
        self.logout_in_progress.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SessionState {
        self.state.read().map(|guard| *guard).unwrap_or_default()
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        if let Ok(mut guard) = self.state.write() {
            *guard = state;
        }
    }
}
