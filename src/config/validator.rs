//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks server address, issuer target, handoff lifetimes,
//!   metrics path and logging invariants

use tracing::{error, info, warn};

use crate::config::settings::SettingsConfig;
use crate::config::types::{HandoffConfig, IssuerConfig, ServiceConfig};
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_issuer(&cfg.issuer, &mut errors);
    validate_handoff(&cfg.handoff, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config error: {}", e);
            metrics.config_validation_errors.inc();
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port",
            settings.server.port
        ));
    }

    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_issuer(issuer: &IssuerConfig, errors: &mut Vec<String>) {
    if !(issuer.origin.starts_with("http://") || issuer.origin.starts_with("https://")) {
        errors.push(format!(
            "issuer.origin '{}' must start with http:// or https://",
            issuer.origin
        ));
    }
    if !issuer.validate_path.starts_with('/') {
        errors.push(format!(
            "issuer.validate_path '{}' must start with '/'",
            issuer.validate_path
        ));
    }
    if issuer.timeout_ms == 0 {
        errors.push("issuer.timeout_ms must be greater than 0".to_string());
    }
}

fn validate_handoff(handoff: &HandoffConfig, errors: &mut Vec<String>) {
    if handoff.token_ttl_seconds <= 0 {
        errors.push(format!(
            "handoff.token_ttl_seconds must be positive, got {}",
            handoff.token_ttl_seconds
        ));
    }
    if handoff.session_ttl_seconds <= 0 {
        errors.push(format!(
            "handoff.session_ttl_seconds must be positive, got {}",
            handoff.session_ttl_seconds
        ));
    }
    if handoff.session_ttl_seconds > 0 && handoff.session_ttl_seconds < handoff.token_ttl_seconds {
        warn!(
            "handoff.session_ttl_seconds ({}) is shorter than handoff.token_ttl_seconds ({})",
            handoff.session_ttl_seconds, handoff.token_ttl_seconds
        );
    }
}
