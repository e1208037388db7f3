//! Session lifecycle
//!
//! The [`SessionCoordinator`] sits between page code and the auth provider. It
//! caches the user's credential in a [`CredentialStore`](crate::store::CredentialStore)
//! and hands it out through [`SessionCoordinator::current_session`], refreshing it
//! first when it is older than the staleness threshold.

mod clock;
mod config;
mod context;
mod coordinator;
mod credential;

pub use clock::*;
pub use config::*;
pub use context::*;
pub use coordinator::*;
pub use credential::*;
