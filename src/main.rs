//! Cardbox API
//!
//! CRUD over a single card collection plus a CSV-backed student-record
//! sidecar. One policy governs every mutating route: malformed input is a
//! 400, a missing record is a 404, any store or filesystem fault is a 500
//! carrying the underlying description.

mod config;
mod error;
mod models;
mod routes;
mod state;
mod store;
mod students;

use crate::config::{Settings, StoreBackend};
use crate::routes::create_router;
use crate::state::AppState;
use crate::store::{CardStore, MemoryCardStore, PgCardStore};
use crate::students::StudentFile;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Cardbox API...");

    let settings = Settings::load()?;
    info!("Configuration loaded successfully");

    // The store must be reachable before any route serves traffic
    let cards = match settings.store.backend {
        StoreBackend::Postgres => match PgCardStore::connect(&settings.store).await {
            Ok(store) => CardStore::Postgres(store),
            Err(e) => {
                error!("FATAL: failed to initialize card store: {}", e);
                return Err(e);
            }
        },
        StoreBackend::Memory => {
            info!("Using in-memory card store (STORE_BACKEND=memory)");
            CardStore::Memory(MemoryCardStore::new())
        }
    };

    let students = StudentFile::new(settings.csv.path.clone());
    let state = Arc::new(AppState::new(cards, students, settings.schema.clone()));

    let app = create_router(state, &settings);

    let addr = SocketAddr::from((settings.server.host, settings.server.port));
    info!("Server listening on http://{}", addr);
    info!("   POST   /createCard");
    info!("   GET    /getAllCards");
    info!("   GET    /getCard/{{id}}");
    info!("   PATCH  /updateCard/{{id}}");
    info!("   PUT    /updateCardFull/{{id}}");
    info!("   DELETE /deleteCard/{{id}}");
    info!("   GET    /hello");
    info!("   GET    /endpoints");
    info!("   GET    /getstudents5CSV");
    info!("   POST   /createstudents5CSV");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cardbox_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
