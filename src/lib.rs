//! # Session Handoff Library
//!
//! Receiver side of a cross-origin session handoff: an issuer pushes a
//! one-time token for a reference id, the receiver's own client later asks
//! to establish a session for that id, and the receiver exchanges the token
//! with the issuer before creating a local session.
//!
//! Modules:
//! - `config`: service configuration, defaults and validation
//! - `store`: token and session stores with atomic claim
//! - `issuer`: validator seam and the HTTP issuer client
//! - `exchange`: the establish-session protocol and its error taxonomy
//! - `server`: axum routes for the inbound operations

pub mod config;
pub mod exchange;
pub mod helpers;
pub mod issuer;
pub mod observability;
pub mod server;
pub mod store;
pub mod utils;
#[cfg(test)]
pub mod tests;


pub use crate::config::types::ServiceConfig;
pub use crate::exchange::{HandoffError, IssuerExchange, SessionExchange};
