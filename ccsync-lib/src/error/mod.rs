//! Error types

mod api;
mod auth;
mod store;

pub use api::*;
pub use auth::*;
pub use store::*;
