use anyhow::Context as _;
use clap::Parser as _;
use monitor::{args::Args, metrics, rest, Acquisition, SnapshotStore};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Args::parse()).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.acquisition_config();

    info!("Starting air-quality monitor");
    info!("Readings hub: {}", config.api_base);
    info!("HTTP server: {}", args.http_addr);

    metrics::init_metrics();

    let store = SnapshotStore::default();

    let acquisition = Acquisition::new(&config, store.clone())
        .context("failed to build HTTP client")?;
    let acquisition_handle = acquisition.spawn();

    let mut changes = store.subscribe();
    let watcher_handle = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let snapshot = *changes.borrow_and_update();
            debug!("Snapshot: {:?}", snapshot);
        }
    });

    let app = rest::create_router(store, acquisition_handle.status());

    let listener = tokio::net::TcpListener::bind(&args.http_addr)
        .await
        .with_context(|| format!("failed to bind to {}", args.http_addr))?;

    info!("HTTP server listening on {}", args.http_addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = server_handle => {
            error!("HTTP server terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down");
    acquisition_handle.shutdown().await;
    watcher_handle.abort();

    Ok(())
}
