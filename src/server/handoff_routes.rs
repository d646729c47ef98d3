use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use tracing::{info, warn};

use crate::exchange::HandoffError;
use crate::helpers::time::now;
use crate::server::server::AppState;
use crate::utils::constants::{ROUTE_ESTABLISH_SESSION, ROUTE_HEALTH, ROUTE_RECEIVE_TOKEN, ROUTE_SESSION};

/// Issuer backend -> receiver backend
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveTokenRequest {
    #[serde(default, alias = "token")]
    pub ott: String,
    #[serde(default)]
    pub reference_id: String,
    /// informational, the identity is taken from the issuer at validation time
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Receiver client -> receiver backend
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstablishSessionRequest {
    #[serde(default)]
    pub reference_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub reference_id: String,
    pub user_id: String,
    pub session_expiry: DateTime<Utc>,
    pub active: bool,
}

pub fn router() -> Router<AppState> {
    for path in [ROUTE_RECEIVE_TOKEN, ROUTE_ESTABLISH_SESSION, ROUTE_SESSION, ROUTE_HEALTH] {
        info!("served path: {}", path);
    }
    Router::new()
        .route(ROUTE_RECEIVE_TOKEN, post(receive_token))
        .route(ROUTE_ESTABLISH_SESSION, post(establish_session))
        .route(ROUTE_SESSION, get(get_session))
        .route(ROUTE_HEALTH, get(health))
}

async fn receive_token(
    State(state): State<AppState>,
    payload: Result<Json<ReceiveTokenRequest>, JsonRejection>,
) -> Result<Json<HandoffResponse>, HandoffError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("malformed token push: {}", rejection.body_text());
        HandoffError::InvalidRequest("OTT and ReferenceId are required.".to_string())
    })?;
    info!(
        "received token from issuer for reference id '{}' (user hint: {})",
        request.reference_id,
        request.user_id.as_deref().unwrap_or("-")
    );

    let exchange = state.exchange.clone();
    run_detached(async move {
        exchange
            .receive_token(&request.reference_id, &request.ott)
            .await
    })
    .await?;

    Ok(Json(HandoffResponse {
        success: true,
        message: "OTT received and stored.".to_string(),
        user_id: None,
    }))
}

async fn establish_session(
    State(state): State<AppState>,
    payload: Result<Json<EstablishSessionRequest>, JsonRejection>,
) -> Result<Json<HandoffResponse>, HandoffError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("malformed establish request: {}", rejection.body_text());
        HandoffError::InvalidRequest("ReferenceId is required.".to_string())
    })?;
    info!("client requested session for reference id '{}'", request.reference_id);

    // the claim is not undone when the client goes away, so the exchange
    // runs to completion on its own task
    let exchange = state.exchange.clone();
    let session = run_detached(async move {
        exchange.establish_session(&request.reference_id).await
    })
    .await?;

    Ok(Json(HandoffResponse {
        success: true,
        message: "Session established.".to_string(),
        user_id: Some(session.user_id),
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
) -> Result<Json<SessionView>, HandoffError> {
    let session = state
        .exchange
        .sessions()
        .get(&reference_id)
        .await
        .ok_or(HandoffError::SessionNotFound)?;

    Ok(Json(SessionView {
        active: session.is_active_at(now()),
        reference_id: session.reference_id,
        user_id: session.user_id,
        session_expiry: session.session_expiry,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Run a handoff step on its own task; a panic there becomes a 500
/// instead of a dropped connection.
async fn run_detached<T, F>(work: F) -> Result<T, HandoffError>
where
    F: Future<Output = Result<T, HandoffError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| HandoffError::Internal(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use http::StatusCode;
    use std::time::Duration;

    use crate::exchange::SessionExchange;
    use crate::helpers::time::seconds;
    use crate::store::session_store::SessionStore;
    use crate::store::token_store::TokenStore;
    use crate::tests::common::{StubBehaviour, StubValidator};

    fn explode() -> Result<(), HandoffError> {
        panic!("store invariant broken at token_store.rs:99")
    }

    async fn body_json(error: HandoffError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn panic_in_handoff_step_becomes_internal_error() {
        let err = run_detached(async { explode() }).await.unwrap_err();
        assert!(matches!(err, HandoffError::Internal(_)), "{:?}", err);

        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "internal");
        let message = body["message"].as_str().unwrap();
        assert!(!message.contains("token_store.rs"), "{}", message);
        assert!(!message.contains("invariant"), "{}", message);
    }

    #[tokio::test]
    async fn panicking_validator_leaves_service_usable() {
        let exchange = SessionExchange::new(
            TokenStore::new(),
            SessionStore::new(),
            StubValidator::new(StubBehaviour::Panic),
            seconds(300),
            seconds(1200),
            Duration::from_millis(200),
        );
        exchange.receive_token("ref-p", "tok").await.unwrap();

        let detached = exchange.clone();
        let err = run_detached(async move { detached.establish_session("ref-p").await })
            .await
            .unwrap_err();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["message"].as_str().unwrap().contains("blew up"));

        // claimed before the panic, so the token stays burned
        assert!(exchange.tokens().get("ref-p").await.unwrap().used);
        assert!(exchange.sessions().get("ref-p").await.is_none());
        let err = exchange.establish_session("ref-p").await.unwrap_err();
        assert!(matches!(err, HandoffError::TokenReplay), "{:?}", err);
    }
}
