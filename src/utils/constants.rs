//! Shared constants and invariants

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 5 * 60;
pub const DEFAULT_SESSION_TTL_SECS: i64 = 20 * 60;
pub const DEFAULT_VALIDATOR_TIMEOUT_MS: u64 = 5000;

pub const DEFAULT_ISSUER_ORIGIN: &str = "http://localhost:7001";
pub const DEFAULT_ISSUER_VALIDATE_PATH: &str = "/api/app2/validate-ott";

// Routes served by the receiver
pub const ROUTE_RECEIVE_TOKEN: &str = "/api/app1-integration/receive-ott";
pub const ROUTE_ESTABLISH_SESSION: &str = "/api/app1-integration/establish-session";
pub const ROUTE_SESSION: &str = "/api/app1-integration/session/{reference_id}";
pub const ROUTE_HEALTH: &str = "/health";
