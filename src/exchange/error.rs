//! Failure taxonomy of the handoff endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Every way a receive or establish request can fail.
///
/// The variant decides the HTTP status, the message is what the caller
/// reads. `Internal` details are logged, never returned.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// Malformed caller input.
    #[error("{0}")]
    InvalidRequest(String),

    /// Nothing was ever pushed for this reference id.
    #[error("no pending token for this reference id")]
    NoPendingToken,

    /// The token was consumed before.
    #[error("token has already been used")]
    TokenReplay,

    /// The token outlived its ttl before anyone claimed it.
    #[error("token has expired")]
    TokenExpired,

    /// The issuer could not be reached or did not speak the protocol.
    #[error("issuer unreachable: {0}")]
    ValidatorUnreachable(String),

    /// The issuer looked at the token and refused it.
    #[error("issuer rejected token: {0}")]
    ValidationRejected(String),

    /// Lookup of a session that was never established.
    #[error("no session for this reference id")]
    SessionNotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
}

impl HandoffError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NoPendingToken | Self::SessionNotFound => StatusCode::NOT_FOUND,
            Self::TokenReplay => StatusCode::CONFLICT,
            Self::TokenExpired | Self::ValidationRejected(_) => StatusCode::UNAUTHORIZED,
            Self::ValidatorUnreachable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-checkable category, stable across message wording changes
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::NoPendingToken => "no_pending_token",
            Self::TokenReplay => "token_replay",
            Self::TokenExpired => "token_expired",
            Self::ValidatorUnreachable(_) => "validator_unreachable",
            Self::ValidationRejected(_) => "validation_rejected",
            Self::SessionNotFound => "session_not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// Only a transient issuer failure is worth retrying, and only by
    /// restarting the handoff at the issuer.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ValidatorUnreachable(_))
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidRequest(message) => message.clone(),
            Self::NoPendingToken => {
                "No valid authentication token found for this session. Please restart the handoff at the issuer.".to_string()
            }
            Self::TokenReplay => "Authentication token has already been used for this session.".to_string(),
            Self::TokenExpired => "Authentication token has expired. Please restart the handoff at the issuer.".to_string(),
            Self::ValidatorUnreachable(_) => "Network error communicating with the issuer.".to_string(),
            Self::ValidationRejected(message) => format!("Issuer validation failed: {}", message),
            Self::SessionNotFound => "No session established for this reference id.".to_string(),
            Self::Internal(_) => "An internal server error occurred.".to_string(),
        }
    }
}

impl IntoResponse for HandoffError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            error!("internal error while handling handoff request: {}", cause);
        }
        let body = ErrorBody {
            success: false,
            error: self.category(),
            message: self.message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
