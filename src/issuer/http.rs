use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::types::IssuerConfig;
use crate::issuer::{ValidateToken, ValidationRequest, ValidationResponse, ValidatorError};

/// Validates tokens against the issuer backend over HTTP
#[derive(Debug, Clone)]
pub struct HttpIssuerValidator {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpIssuerValidator {
    pub fn new(config: &IssuerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build issuer HTTP client")?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &IssuerConfig) -> Self {
        Self {
            client,
            url: config.validate_url(),
            timeout: config.timeout(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> ValidatorError {
        if err.is_timeout() {
            ValidatorError::Timeout(self.timeout.as_millis())
        } else {
            ValidatorError::Transport(err.to_string())
        }
    }
}

impl ValidateToken for HttpIssuerValidator {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResponse, ValidatorError> {
        info!("calling issuer for token validation at: {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        // anything but 2xx means the issuer never gave a verdict
        if !response.status().is_success() {
            return Err(ValidatorError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| ValidatorError::Decode(e.to_string()))?;
        if !value.is_object() {
            return Err(ValidatorError::Decode("expected a JSON object".to_string()));
        }

        let verdict = ValidationResponse::from_value(&value);
        debug!(
            "issuer verdict for reference id '{}': success={}",
            request.reference_id, verdict.success
        );
        Ok(verdict)
    }
}
