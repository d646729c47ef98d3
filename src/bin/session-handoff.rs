use clap::arg;
use clap::command;
use clap::Parser;
use session_handoff::exchange::SessionExchange;
use session_handoff::issuer::HttpIssuerValidator;
use session_handoff::server;
use session_handoff::store::session_store::SessionStore;
use session_handoff::store::token_store::TokenStore;
use session_handoff::utils::config_loader;
use session_handoff::utils::logging;
use anyhow::Result;
use session_handoff::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "session-handoff.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args, load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Create stores and issuer client
    // -------------------------------

    let tokens = TokenStore::new();
    let sessions = SessionStore::new();
    let validator = HttpIssuerValidator::new(&service_config.issuer)?;
    info!("issuer validation endpoint: {}", validator.url());

    // -------------------------------
    // 3. Wire the exchange
    // -------------------------------

    let handoff = &service_config.handoff;
    let exchange = SessionExchange::new(
        tokens,
        sessions,
        validator,
        handoff.token_ttl(),
        handoff.session_ttl(),
        service_config.issuer.timeout(),
    );

    // -------------------------------
    // 4. Start http server
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config.settings, exchange).await
}
