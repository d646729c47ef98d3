pub mod coordinator;
pub mod error;

pub use coordinator::SessionExchange;
pub use error::HandoffError;

use crate::issuer::HttpIssuerValidator;

/// Exchange wired to the real issuer, as served over HTTP
pub type IssuerExchange = SessionExchange<HttpIssuerValidator>;
