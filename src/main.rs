use chrono::Utc;
use marketplace_mock::config::Config;
use marketplace_mock::db::MarketStorage;
use marketplace_mock::router::{MarketState, market_router};
use marketplace_mock::service::seed::apply_seed;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        listen_addr = %cfg.basic.listen_addr,
        loglevel = %cfg.basic.loglevel,
        token_ttl_secs = cfg.api.token_ttl_secs,
        "configuration loaded"
    );

    let storage =
        MarketStorage::connect(&cfg.basic.database_url, cfg.basic.max_connections).await?;

    if cfg.seed.credentials.is_empty() {
        warn!("no seed credentials configured; tokens can only be issued for existing rows");
    } else {
        let seeded = apply_seed(
            &storage,
            &cfg.seed.credentials,
            cfg.api.token_ttl_secs,
            Utc::now(),
        )
        .await?;
        info!(count = seeded, "seed credentials applied");
    }

    let state = MarketState::new(storage, cfg.api.clone());
    let app = market_router(state);

    let listener = TcpListener::bind(&cfg.basic.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
