use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};
use crate::config::settings::SettingsConfig;
use crate::exchange::IssuerExchange;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::handoff_routes;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub exchange: IssuerExchange,
}

impl AppState {
    pub fn new (
        metrics: &Metrics,
        exchange: IssuerExchange,
    ) -> Self{
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            exchange,
        }
    }
}

/// Build the full router: handoff routes plus metrics when enabled
pub fn build_router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(handoff_routes::router())
        .with_state(state)
}

/// Start one Axum server for the handoff endpoints, until ctrl-c.
pub async fn start(
    settings_config: &SettingsConfig,
    exchange: IssuerExchange,
) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, exchange);
    let app = build_router(settings_config, state);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("listening on {}", bind_addr);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;
    metrics.up.set(0);

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down gracefully"),
        Err(e) => {
            // without a signal handler the server just runs until killed
            error!("failed to install ctrl-c handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
