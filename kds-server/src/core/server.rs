//! Serve loop with graceful shutdown
//!
//! Runs the axum router until ctrl-c (or an external cancellation), then
//! drains the event bus so every connected viewer session observes a clean
//! close instead of a dropped socket.

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::AppState;

/// Serve the API until shutdown is requested
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr();

    let app = api::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Kitchen display server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Ctrl-c received, shutting down");
        })
        .await?;

    // Drain viewer sessions after the listener stops accepting
    state.bus.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}
