//! HTTP front end for CopyBridge.
//!
//! The store handle is opened once at startup, shared by all handlers
//! through router state, and closed after the server has drained.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use copybridge_clipboard::ClipboardService;
use copybridge_common::Result;
use copybridge_store::{create_default_registry, ClipboardStore};

pub use config::{ServerConfig, StoreConfig};
pub use error::ApiError;
pub use routes::router;

/// Open the configured store.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn ClipboardStore>> {
    let registry = create_default_registry()?;
    registry.resolve(&config.kind, config.config.clone())
}

/// Serve on an already bound listener until `shutdown` resolves, then
/// close the store.
pub async fn run(
    listener: TcpListener,
    service: ClipboardService,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let store = Arc::clone(service.store());
    let app = router(service);

    info!(addr = %listener.local_addr()?, store = store.name(), "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    store.close().await?;
    info!("Server stopped");
    Ok(())
}

/// Open the store, bind the configured address and serve until `shutdown`.
pub async fn serve(
    config: ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let store = open_store(&config.store)?;
    let service = ClipboardService::new(store, config.cipher_suite());
    let listener = TcpListener::bind(config.listen_addr).await?;
    run(listener, service, shutdown).await
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
