use chrono::TimeDelta;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::helpers::time::{expiry_after, now};
use crate::observability::metrics::get_metrics;
use crate::store::token::{ClaimOutcome, TokenRecord};

/// Pending one-time tokens: reference_id -> record.
///
/// Records are never removed; a used record stays as a tombstone so that
/// a replay is reported as such instead of as a missing token.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<HashMap<String, TokenRecord>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or overwrite the token for `reference_id` with `used = false`.
    ///
    /// Returns `true` when a still live token was replaced. That points at
    /// an issuer retry or a reference id collision, so it is logged.
    pub async fn put(&self, reference_id: &str, token: &str, ttl: TimeDelta) -> bool {
        let received_at = now();
        let record = TokenRecord::new(
            reference_id.to_owned(),
            token.to_owned(),
            received_at,
            expiry_after(ttl),
        );
        let expiry = record.expiry;

        let replaced_live = {
            let mut map = self.inner.write().await;
            map.insert(reference_id.to_owned(), record)
                .map(|previous| previous.is_live_at(received_at))
                .unwrap_or(false)
        };

        let metrics = get_metrics().await;
        metrics.tokens_received.inc();
        if replaced_live {
            metrics.tokens_overwritten.inc();
            warn!("overwriting unused token for reference id '{}'", reference_id);
        }
        info!("stored token for reference id '{}', expiry: {}", reference_id, expiry.to_rfc3339());
        replaced_live
    }

    /// Atomically look up and consume the token for `reference_id`.
    ///
    /// The write guard is held across check and mark, so two concurrent
    /// claims for the same id can never both observe `Claimed`.
    pub async fn try_claim(&self, reference_id: &str) -> ClaimOutcome {
        let outcome = {
            let mut map = self.inner.write().await;
            match map.get_mut(reference_id) {
                None => ClaimOutcome::NotFound,
                Some(record) if record.used => ClaimOutcome::AlreadyUsed(record.clone()),
                Some(record) if record.is_expired_at(now()) => {
                    // expired tokens are retired, not left claimable
                    record.used = true;
                    ClaimOutcome::Expired(record.clone())
                }
                Some(record) => {
                    record.used = true;
                    ClaimOutcome::Claimed(record.clone())
                }
            }
        };

        get_metrics()
            .await
            .token_claims
            .with_label_values(&[outcome.label()])
            .inc();
        debug!("claim for reference id '{}': {}", reference_id, outcome.label());
        outcome
    }

    /// Read-only snapshot of a record, used for diagnostics and tests
    pub async fn get(&self, reference_id: &str) -> Option<TokenRecord> {
        self.inner.read().await.get(reference_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
