// End-to-end handoff over HTTP:
//  - issuer backend (httpmock) pushes nothing itself, the test plays its part
//    by POSTing to receive-ott
//  - the receiver client then calls establish-session
//  - the receiver validates against the mocked issuer

#[cfg(test)]
mod test {

    use std::net::SocketAddr;
    use std::time::Duration;

    use anyhow::Result;
    use http::StatusCode;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::{json, Value};

    use crate::config::settings::SettingsConfig;
    use crate::config::types::IssuerConfig;
    use crate::exchange::{IssuerExchange, SessionExchange};
    use crate::helpers::time::seconds;
    use crate::issuer::HttpIssuerValidator;
    use crate::observability::metrics::get_metrics;
    use crate::server::server::{build_router, AppState};
    use crate::store::session_store::SessionStore;
    use crate::store::token_store::TokenStore;
    use crate::tests::common::{build_reqwest_client, spawn_axum, JoinHandle};

    const VALIDATE_PATH: &str = "/api/app2/validate-ott";

    struct Receiver {
        exchange: IssuerExchange,
        handle: JoinHandle<()>,
        addr: SocketAddr,
    }

    impl Receiver {
        fn url(&self, path: &str) -> String {
            format!("http://{}{}", self.addr, path)
        }
    }

    async fn start_receiver(issuer: &MockServer) -> Receiver {
        let mut issuer_config = IssuerConfig::new(issuer.base_url());
        issuer_config.timeout_ms = 500;
        let validator = HttpIssuerValidator::new(&issuer_config).unwrap();

        let exchange = SessionExchange::new(
            TokenStore::new(),
            SessionStore::new(),
            validator,
            seconds(300),
            seconds(1200),
            Duration::from_millis(500),
        );

        let mut settings = SettingsConfig::default();
        settings.metrics.is_enabled = true;

        let state = AppState::new(get_metrics().await, exchange.clone());
        let (handle, addr) = spawn_axum(build_router(&settings, state)).await;
        Receiver { exchange, handle, addr }
    }

    async fn push_token(receiver: &Receiver, body: Value) -> (StatusCode, Value) {
        post_json(receiver, "/api/app1-integration/receive-ott", body).await
    }

    async fn establish(receiver: &Receiver, reference_id: &str) -> (StatusCode, Value) {
        post_json(
            receiver,
            "/api/app1-integration/establish-session",
            json!({ "referenceId": reference_id }),
        )
        .await
    }

    async fn post_json(receiver: &Receiver, path: &str, body: Value) -> (StatusCode, Value) {
        let response = build_reqwest_client()
            .post(receiver.url(path))
            .json(&body)
            .send()
            .await
            .expect("receiver request");
        let status = response.status();
        let json: Value = response.json().await.expect("invalid JSON");
        (status, json)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn token_push_then_establish_creates_session() -> Result<()> {
        let issuer = MockServer::start_async().await;
        let validate = issuer
            .mock_async(|when, then| {
                when.method(POST)
                    .path(VALIDATE_PATH)
                    .json_body(json!({"ott": "tok-abc", "referenceId": "ref-1"}));
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"success": true, "userId": "u42"}));
            })
            .await;
        let receiver = start_receiver(&issuer).await;

        // -------------------------------
        // 1. Issuer pushes the token
        // -------------------------------
        let (status, body) = push_token(
            &receiver,
            json!({"ott": "tok-abc", "referenceId": "ref-1", "userId": "hint"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        // -------------------------------
        // 2. Client establishes the session
        // -------------------------------
        let (status, body) = establish(&receiver, "ref-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["userId"], "u42");
        validate.assert_async().await;

        let session = receiver.exchange.sessions().get("ref-1").await.expect("session stored");
        assert_eq!(session.user_id, "u42");

        // -------------------------------
        // 3. Session lookup
        // -------------------------------
        let response = build_reqwest_client()
            .get(receiver.url("/api/app1-integration/session/ref-1"))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let view: Value = response.json().await?;
        assert_eq!(view["referenceId"], "ref-1");
        assert_eq!(view["userId"], "u42");
        assert_eq!(view["active"], true);

        // -------------------------------
        // 4. Replay is a conflict, issuer is not asked again
        // -------------------------------
        let (status, body) = establish(&receiver, "ref-1").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "token_replay");
        validate.assert_async().await;

        receiver.handle.abort();
        Ok(())
    }

    #[tokio::test]
    async fn token_push_validates_required_fields() {
        let issuer = MockServer::start_async().await;
        let receiver = start_receiver(&issuer).await;

        let (status, body) = push_token(&receiver, json!({"referenceId": "ref-1"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");

        let (status, _) = push_token(&receiver, json!({"ott": "tok", "referenceId": ""})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = push_token(&receiver, json!(["not", "an", "object"])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(receiver.exchange.tokens().is_empty().await);

        // `token` is accepted as an alias of `ott`
        let (status, _) = push_token(&receiver, json!({"token": "tok", "referenceId": "ref-2"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receiver.exchange.tokens().get("ref-2").await.unwrap().token, "tok");

        receiver.handle.abort();
    }

    #[tokio::test]
    async fn establish_maps_lifecycle_failures() {
        let issuer = MockServer::start_async().await;
        let receiver = start_receiver(&issuer).await;

        let (status, body) = establish(&receiver, "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");

        let (status, body) = establish(&receiver, "never-pushed").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no_pending_token");

        receiver.exchange.tokens().put("ref-2", "tok-xyz", seconds(-1)).await;
        let (status, body) = establish(&receiver, "ref-2").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "token_expired");

        let response = build_reqwest_client()
            .get(receiver.url("/api/app1-integration/session/ref-2"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        receiver.handle.abort();
    }

    #[tokio::test]
    async fn issuer_rejection_is_surfaced() {
        let issuer = MockServer::start_async().await;
        issuer
            .mock_async(|when, then| {
                when.method(POST).path(VALIDATE_PATH);
                then.status(200)
                    .json_body(json!({"success": false, "message": "OTT not recognised"}));
            })
            .await;
        let receiver = start_receiver(&issuer).await;

        push_token(&receiver, json!({"ott": "tok", "referenceId": "ref-3"})).await;
        let (status, body) = establish(&receiver, "ref-3").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "validation_rejected");
        assert!(body["message"].as_str().unwrap().contains("OTT not recognised"));
        assert!(receiver.exchange.sessions().get("ref-3").await.is_none());

        receiver.handle.abort();
    }

    #[tokio::test]
    async fn issuer_failure_burns_token() {
        let issuer = MockServer::start_async().await;
        let validate = issuer
            .mock_async(|when, then| {
                when.method(POST).path(VALIDATE_PATH);
                then.status(500).body("boom");
            })
            .await;
        let receiver = start_receiver(&issuer).await;

        push_token(&receiver, json!({"ott": "tok", "referenceId": "ref-4"})).await;

        let (status, body) = establish(&receiver, "ref-4").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "validator_unreachable");

        let (status, _) = establish(&receiver, "ref-4").await;
        assert_eq!(status, StatusCode::CONFLICT);
        validate.assert_async().await;

        receiver.handle.abort();
    }

    #[tokio::test]
    async fn health_and_metrics_are_served() {
        let issuer = MockServer::start_async().await;
        let receiver = start_receiver(&issuer).await;
        let client = build_reqwest_client();

        let health: Value = client
            .get(receiver.url("/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");

        // make sure at least one labelled claim sample exists
        establish(&receiver, "metrics-probe").await;

        let response = client.get(receiver.url("/metrics")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = response.text().await.unwrap();
        assert!(text.contains("sessionhandoff_token_claims_total"), "{}", text);
        assert!(text.contains("sessionhandoff_establish_requests_total"), "{}", text);

        receiver.handle.abort();
    }

}
