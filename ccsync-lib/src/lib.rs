//! CCSync client library
//!
//! Session management for CCSync front ends: an auth-provider-backed
//! [`SessionCoordinator`](session::SessionCoordinator) that hands out fresh
//! credentials, persistent credential stores, and a bearer-authorized REST client.

pub mod auth;
pub mod error;
pub mod session;
pub mod store;

mod client;

pub use client::*;
