use chrono::{DateTime, Utc};

/// One-time token forwarded by the issuer for a reference id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub reference_id: String,
    /// opaque, only the issuer can interpret it
    pub token: String,
    pub expiry: DateTime<Utc>,
    pub used: bool,
    pub received_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn new(reference_id: String, token: String, received_at: DateTime<Utc>, expiry: DateTime<Utc>) -> Self {
        Self {
            reference_id,
            token,
            expiry,
            used: false,
            received_at,
        }
    }

    /// expiry is exclusive: the token is dead at `expiry`
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        self.expiry <= at
    }

    pub fn is_live_at(&self, at: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired_at(at)
    }
}

/// Result of the single consuming operation of the token store.
///
/// Every variant except `NotFound` carries the record as it looks
/// after the claim attempt, i.e. with `used == true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    NotFound,
    AlreadyUsed(TokenRecord),
    Expired(TokenRecord),
    Claimed(TokenRecord),
}

impl ClaimOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ClaimOutcome::NotFound => "not_found",
            ClaimOutcome::AlreadyUsed(_) => "already_used",
            ClaimOutcome::Expired(_) => "expired",
            ClaimOutcome::Claimed(_) => "claimed",
        }
    }
}
