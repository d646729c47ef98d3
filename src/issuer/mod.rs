//! Issuer module
//!
//! The issuer is a remote black box that decides whether a one-time token
//! is genuine. This module defines the seam the exchange talks through and
//! the HTTP implementation used in production.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

pub mod http;

pub use http::HttpIssuerValidator;

/// Body sent to the issuer's validation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    #[serde(rename = "ott")]
    pub token: String,
    pub reference_id: String,
}

/// Issuer's verdict. A missing `success` is a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ValidationResponse {
    pub fn accepted(user_id: impl Into<String>) -> Self {
        Self {
            success: true,
            user_id: Some(user_id.into()),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            user_id: None,
            message: Some(message.into()),
        }
    }

    /// Lenient reading of an issuer body: only a JSON `true` counts as
    /// success, and non-string `userId`/`message` values are ignored.
    pub fn from_value(value: &Value) -> Self {
        Self {
            success: value.get("success").and_then(Value::as_bool).unwrap_or(false),
            user_id: value.get("userId").and_then(Value::as_str).map(str::to_owned),
            message: value.get("message").and_then(Value::as_str).map(str::to_owned),
        }
    }
}

/// The issuer could not be asked, as opposed to the issuer saying no.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("no response within {0} ms")]
    Timeout(u128),

    #[error("issuer answered with status {0}")]
    Status(u16),

    #[error("undecodable issuer response: {0}")]
    Decode(String),
}

pub trait ValidateToken {
    fn validate(
        &self,
        request: &ValidationRequest,
    ) -> impl Future<Output = Result<ValidationResponse, ValidatorError>> + Send;
}
