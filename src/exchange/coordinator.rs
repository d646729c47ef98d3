use chrono::TimeDelta;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::exchange::error::HandoffError;
use crate::helpers::time::get_instant;
use crate::issuer::{ValidateToken, ValidationRequest, ValidationResponse, ValidatorError};
use crate::observability::metrics::get_metrics;
use crate::store::session::{SessionRecord, UNKNOWN_USER_ID};
use crate::store::session_store::SessionStore;
use crate::store::token::ClaimOutcome;
use crate::store::token_store::TokenStore;

const UNKNOWN_REJECTION: &str = "Unknown validation error from issuer.";

/// Receiver side of the handoff.
///
/// Accepts tokens pushed by the issuer and converts them into local
/// sessions. The token is claimed before the issuer is called, so a
/// token is validated at most once even under concurrent requests; the
/// price is that a failed issuer call burns the token.
#[derive(Debug)]
pub struct SessionExchange<V> {
    tokens: TokenStore,
    sessions: SessionStore,
    validator: Arc<V>,
    token_ttl: TimeDelta,
    session_ttl: TimeDelta,
    validator_timeout: Duration,
}

impl<V> Clone for SessionExchange<V> {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens.clone(),
            sessions: self.sessions.clone(),
            validator: self.validator.clone(),
            token_ttl: self.token_ttl,
            session_ttl: self.session_ttl,
            validator_timeout: self.validator_timeout,
        }
    }
}

impl<V: ValidateToken> SessionExchange<V> {
    pub fn new(
        tokens: TokenStore,
        sessions: SessionStore,
        validator: V,
        token_ttl: TimeDelta,
        session_ttl: TimeDelta,
        validator_timeout: Duration,
    ) -> Self {
        Self {
            tokens,
            sessions,
            validator: Arc::new(validator),
            token_ttl,
            session_ttl,
            validator_timeout,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Store a token pushed by the issuer. Both fields are required.
    pub async fn receive_token(&self, reference_id: &str, token: &str) -> Result<(), HandoffError> {
        if reference_id.is_empty() || token.is_empty() {
            warn!("rejecting token push with missing token or reference id");
            return Err(HandoffError::InvalidRequest(
                "OTT and ReferenceId are required.".to_string(),
            ));
        }
        self.tokens.put(reference_id, token, self.token_ttl).await;
        Ok(())
    }

    /// Claim the pending token for `reference_id`, have the issuer
    /// validate it and materialize a local session on success.
    pub async fn establish_session(&self, reference_id: &str) -> Result<SessionRecord, HandoffError> {
        let result = self.run_establish(reference_id).await;

        let label = match &result {
            Ok(_) => "success",
            Err(e) => e.category(),
        };
        get_metrics()
            .await
            .establish_requests
            .with_label_values(&[label])
            .inc();
        result
    }

    async fn run_establish(&self, reference_id: &str) -> Result<SessionRecord, HandoffError> {
        if reference_id.is_empty() {
            return Err(HandoffError::InvalidRequest("ReferenceId is required.".to_string()));
        }

        let claimed = match self.tokens.try_claim(reference_id).await {
            ClaimOutcome::Claimed(record) => record,
            ClaimOutcome::NotFound => {
                warn!("no token found for reference id '{}'", reference_id);
                return Err(HandoffError::NoPendingToken);
            }
            ClaimOutcome::AlreadyUsed(_) => {
                warn!("token for reference id '{}' has already been used", reference_id);
                return Err(HandoffError::TokenReplay);
            }
            ClaimOutcome::Expired(record) => {
                warn!(
                    "token for reference id '{}' expired at {}, retired",
                    reference_id,
                    record.expiry.to_rfc3339()
                );
                return Err(HandoffError::TokenExpired);
            }
        };

        // from here on the token is burned whatever the issuer says
        let request = ValidationRequest {
            token: claimed.token,
            reference_id: reference_id.to_owned(),
        };
        let verdict = self.call_validator(&request).await.map_err(|e| {
            error!(
                "issuer validation call failed for reference id '{}': {}",
                reference_id, e
            );
            HandoffError::ValidatorUnreachable(e.to_string())
        })?;

        if !verdict.success {
            let message = verdict.message.unwrap_or_else(|| UNKNOWN_REJECTION.to_string());
            warn!("issuer rejected token for reference id '{}': {}", reference_id, message);
            return Err(HandoffError::ValidationRejected(message));
        }

        let user_id = verdict.user_id.unwrap_or_else(|| UNKNOWN_USER_ID.to_string());
        let session = self.sessions.put(reference_id, &user_id, self.session_ttl).await;
        get_metrics().await.sessions_established.inc();
        info!("session established for reference id '{}'", reference_id);
        Ok(session)
    }

    async fn call_validator(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, ValidatorError> {
        let start = get_instant();
        let result = tokio::time::timeout(self.validator_timeout, self.validator.validate(request))
            .await
            .unwrap_or_else(|_| Err(ValidatorError::Timeout(self.validator_timeout.as_millis())));

        let label = match &result {
            Ok(verdict) if verdict.success => "accepted",
            Ok(_) => "rejected",
            Err(_) => "failed",
        };
        get_metrics()
            .await
            .validator_duration
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());
        result
    }
}
