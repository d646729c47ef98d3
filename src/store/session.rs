use chrono::{DateTime, Utc};

/// Identity used when the issuer validates a token without naming the user
pub const UNKNOWN_USER_ID: &str = "Unknown";

/// Local session established after a successful exchange with the issuer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub reference_id: String,
    pub session_expiry: DateTime<Utc>,
    pub user_id: String,
}

impl SessionRecord {
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        at < self.session_expiry
    }
}
