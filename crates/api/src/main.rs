use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use ridegate_api::app::{build_app, AuthServices};
use ridegate_infra::{AppConfig, RevocationSweeper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    ridegate_observability::init(config.env.is_development());

    let (services, ledger) =
        AuthServices::in_memory(&config).context("failed to initialise auth services")?;
    let sweeper = RevocationSweeper::spawn(ledger, config.sweep_interval)
        .context("failed to spawn revocation sweeper")?;

    let app = build_app(Arc::new(services));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        env = config.env.as_str(),
        token_ttl_secs = config.token_ttl.as_secs(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.shutdown();
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
