use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process metrics.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token store metrics
    pub tokens_received: IntCounter,
    pub tokens_overwritten: IntCounter,
    pub token_claims: IntCounterVec,

    // Exchange metrics
    pub establish_requests: IntCounterVec,
    pub validator_duration: HistogramVec,
    pub sessions_established: IntCounter,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("sessionhandoff".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token store
            tokens_received: IntCounter::new("tokens_received_total", "Tokens pushed by the issuer").unwrap(),
            tokens_overwritten: IntCounter::new("tokens_overwritten_total", "Live tokens replaced by a newer push for the same reference id").unwrap(),
            token_claims: IntCounterVec::new(Opts::new("token_claims_total", "Claim attempts by outcome"),&["outcome"],).unwrap(),

            // Exchange
            establish_requests: IntCounterVec::new(Opts::new("establish_requests_total", "Establish session requests by result"),&["result"],).unwrap(),
            validator_duration: HistogramVec::new(HistogramOpts::new("validator_duration_seconds", "Issuer validation call duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["result"],).unwrap(),
            sessions_established: IntCounter::new("sessions_established_total", "Sessions materialized after successful validation").unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.tokens_received.clone())).unwrap();
        reg.register(Box::new(metrics.tokens_overwritten.clone())).unwrap();
        reg.register(Box::new(metrics.token_claims.clone())).unwrap();
        reg.register(Box::new(metrics.establish_requests.clone())).unwrap();
        reg.register(Box::new(metrics.validator_duration.clone())).unwrap();
        reg.register(Box::new(metrics.sessions_established.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
