//! HTTP boundary for the harvester job engine.
mod config;
mod error;
pub mod logging;
mod routes;

pub use config::Cli;
pub use error::{ApiError, ErrorResponse, ServerError};
pub use routes::{router, CreatedJob};

use std::net::SocketAddr;

use engine_logging::engine_info;
use harvester_engine::JobEngine;
use tokio::net::TcpListener;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, engine: JobEngine) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    engine_info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    engine_info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        engine_info!("Shutdown requested");
    }
}
