use chrono::TimeDelta;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::helpers::time::expiry_after;
use crate::store::session::SessionRecord;

/// Established sessions: reference_id -> record.
/// Expiry is advisory, stale records stay until overwritten.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn put(&self, reference_id: &str, user_id: &str, ttl: TimeDelta) -> SessionRecord {
        let record = SessionRecord {
            reference_id: reference_id.to_owned(),
            session_expiry: expiry_after(ttl),
            user_id: user_id.to_owned(),
        };
        self.inner
            .write()
            .await
            .insert(reference_id.to_owned(), record.clone());
        info!(
            "session stored for reference id '{}', user '{}', expiry: {}",
            reference_id,
            user_id,
            record.session_expiry.to_rfc3339()
        );
        record
    }

    /// No liveness filtering, callers compare `session_expiry` themselves
    pub async fn get(&self, reference_id: &str) -> Option<SessionRecord> {
        self.inner.read().await.get(reference_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
