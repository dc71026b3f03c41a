//! tb-web: HTTP demo host embedding the accounting engine in-process.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

mod api;
mod config;
mod error;
mod routes;
mod state;

use config::Config;
use state::AppState;
use tb_engine::StoreConfig;

/// Build the application router over the given state. Factored out of
/// `main` so route tests can drive it directly with `tower::ServiceExt`.
fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/accounts",
            post(routes::accounts::create_accounts).get(routes::accounts::lookup_accounts),
        )
        .route("/accounts/{id}", get(routes::accounts::get_account))
        .route(
            "/accounts/{id}/transfers",
            get(routes::accounts::get_account_transfers),
        )
        .route(
            "/transfers",
            post(routes::transfers::create_transfers).get(routes::transfers::lookup_transfers),
        )
        .route("/transfers/{id}", get(routes::transfers::get_transfer))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

/// HTTP demo host embedding the accounting engine in-process.
#[derive(Parser, Debug)]
#[command(name = "tb-web")]
#[command(about = "HTTP demo host embedding tb-engine", long_about = None)]
struct Args {
    /// Address to bind the web server.
    #[arg(long, default_value = "127.0.0.1:8080")]
    address: String,

    /// File the engine's state is persisted to between runs.
    #[arg(long, default_value = "tb-web.snapshot")]
    snapshot_path: PathBuf,

    /// Maximum number of accounts the embedded engine can hold.
    #[arg(long, default_value_t = 1 << 16)]
    max_accounts: usize,

    /// Maximum number of transfers the embedded engine can hold.
    #[arg(long, default_value_t = 1 << 20)]
    max_transfers: usize,

    /// Maximum number of concurrently pending transfers.
    #[arg(long, default_value_t = 1 << 16)]
    max_pending_transfers: usize,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let address: SocketAddr = args.address.parse()?;

    let config = Config {
        address,
        snapshot_path: args.snapshot_path,
        store: StoreConfig {
            max_accounts: args.max_accounts,
            max_transfers: args.max_transfers,
            max_pending_transfers: args.max_pending_transfers,
        },
    };

    let state = AppState::new(config.clone())?;
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("tb-web listening on http://{}", address);

    let shutdown_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            if let Err(err) = shutdown_state.persist() {
                tracing::error!(%err, "failed to persist snapshot on shutdown");
            } else {
                tracing::info!("snapshot persisted");
            }
        })
        .await?;

    Ok(())
}
