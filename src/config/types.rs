use chrono::TimeDelta;
use serde::Deserialize;
use std::time::Duration;

use crate::config::settings::SettingsConfig;
use crate::helpers::time::seconds;
use crate::utils::constants::{
    DEFAULT_ISSUER_ORIGIN, DEFAULT_ISSUER_VALIDATE_PATH, DEFAULT_SESSION_TTL_SECS,
    DEFAULT_TOKEN_TTL_SECS, DEFAULT_VALIDATOR_TIMEOUT_MS,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub issuer: IssuerConfig,
    #[serde(default)]
    pub handoff: HandoffConfig,
}

/// ================================
/// Issuer (remote validator)
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct IssuerConfig {
    /// scheme + host (+ port) of the issuer backend
    #[serde(default = "default_issuer_origin")]
    pub origin: String,
    #[serde(default = "default_validate_path")]
    pub validate_path: String,
    /// bound for a single validation round-trip
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl IssuerConfig {
    pub fn new(origin: String) -> Self {
        Self {
            origin,
            validate_path: default_validate_path(),
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn validate_url(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), self.validate_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self::new(default_issuer_origin())
    }
}

/// ================================
/// Handoff lifetimes
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct HandoffConfig {
    /// counted from receipt, not from issuer mint time
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: i64,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: i64,
}

impl HandoffConfig {
    pub fn token_ttl(&self) -> TimeDelta {
        seconds(self.token_ttl_seconds)
    }

    pub fn session_ttl(&self) -> TimeDelta {
        seconds(self.session_ttl_seconds)
    }
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            token_ttl_seconds: default_token_ttl(),
            session_ttl_seconds: default_session_ttl(),
        }
    }
}

fn default_issuer_origin() -> String {
    DEFAULT_ISSUER_ORIGIN.to_string()
}

fn default_validate_path() -> String {
    DEFAULT_ISSUER_VALIDATE_PATH.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_VALIDATOR_TIMEOUT_MS
}

fn default_token_ttl() -> i64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_session_ttl() -> i64 {
    DEFAULT_SESSION_TTL_SECS
}
