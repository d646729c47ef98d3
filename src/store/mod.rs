//! Process-local stores for pending tokens and established sessions.

pub mod session;
pub mod session_store;
pub mod token;
pub mod token_store;
