//! Authentication

pub(crate) mod common;
mod config;
mod firebase;
mod provider;

pub use config::FirebaseConfig;
pub use firebase::FirebaseAuth;
pub use provider::AuthIdentity;
pub use provider::AuthProvider;
pub use provider::AuthState;
