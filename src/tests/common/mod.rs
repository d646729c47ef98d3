// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::issuer::{ValidateToken, ValidationRequest, ValidationResponse, ValidatorError};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// What the stub issuer does when asked to validate
#[derive(Debug, Clone)]
pub enum StubBehaviour {
    Respond(ValidationResponse),
    Slow(ValidationResponse, Duration),
    Unreachable,
    /// never answers, relies on the caller's timeout
    Hang,
    Panic,
}

/// In-process issuer that records every request it sees
#[derive(Debug)]
pub struct StubValidator {
    behaviour: StubBehaviour,
    calls: AtomicUsize,
    requests: Mutex<Vec<ValidationRequest>>,
}

impl StubValidator {
    pub fn new(behaviour: StubBehaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn requests(&self) -> Vec<ValidationRequest> {
        self.requests.lock().await.clone()
    }
}

impl ValidateToken for StubValidator {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResponse, ValidatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());

        match &self.behaviour {
            StubBehaviour::Respond(response) => Ok(response.clone()),
            StubBehaviour::Slow(response, delay) => {
                tokio::time::sleep(*delay).await;
                Ok(response.clone())
            }
            StubBehaviour::Unreachable => Err(ValidatorError::Transport("connection refused".into())),
            StubBehaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ValidatorError::Timeout(3_600_000))
            }
            StubBehaviour::Panic => panic!("stub issuer blew up on {}", request.reference_id),
        }
    }
}
