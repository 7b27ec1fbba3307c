use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::signal;
use tracing::info;

use cardrank::api::routes::{create_router, AppState};
use cardrank::catalog::{CatalogLoader, CatalogWatcher, PostgresCatalog, SourceWatcher};
use cardrank::config::Config;
use cardrank::observability::{init_tracing, MetricsRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting cardrank ranking engine"
    );

    // Postgres catalog when a database URL is configured, files otherwise
    let (snapshot_rx, catalog_handle) = if let Some(url) = &config.database_url {
        info!("Using Postgres catalog source");
        let source = PostgresCatalog::connect(url, 1, 5).await?;
        let watcher = SourceWatcher::new(source, config.catalog_reload_interval());
        watcher.start().await
    } else {
        info!(
            catalog = %config.catalog_path.display(),
            merchants = %config.merchants_path.display(),
            "Using file catalog source"
        );
        let loader = CatalogLoader::new(
            config.catalog_path.to_string_lossy(),
            config.merchants_path.to_string_lossy(),
        );
        let watcher = CatalogWatcher::new(loader, config.catalog_reload_interval());
        watcher.start()
    };

    let state = Arc::new(AppState {
        snapshot_rx,
        metrics: Arc::new(MetricsRegistry::new()),
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_limit: config.default_limit(),
        latency_budget_ms: config.latency_budget_ms,
    });

    let app = create_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Listening");

    if config.graceful_shutdown {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, app).await?;
    }

    catalog_handle.abort();
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("ctrl-c handler installation failed");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation failed")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received, draining connections");
}
