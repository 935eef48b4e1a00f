//! Edge Guard Service - Main Entry Point

use std::time::Duration;

use edge_guard::shutdown::{ShutdownCoordinator, run_with_graceful_shutdown, wait_for_signal};
use edge_guard::{Config, SERVICE_NAME, build_app};
use rust_common::{ProcessEnv, TracingConfig, init_tracing};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (also loads .env)
    let config = Config::from_env()?;

    init_tracing(&TracingConfig::from_lookup(&ProcessEnv, SERVICE_NAME))?;

    info!(
        upstream = %config.upstream_url,
        auth_entry = %config.auth_entry_path,
        protected_landing = %config.protected_landing_path,
        cookie_mode = ?config.provider_cookie_mode,
        "Starting Edge Guard Service"
    );

    let app = build_app(&config)?;
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Edge Guard Service listening on {}", listener.local_addr()?);

    let coordinator = ShutdownCoordinator::new();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(coordinator.subscribe().recv())
        .into_future();

    run_with_graceful_shutdown(
        server,
        wait_for_signal(),
        coordinator,
        Duration::from_secs(config.shutdown_timeout_secs),
    )
    .await;

    info!("Edge Guard Service stopped");
    Ok(())
}
