use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use super::router::app_router;
use crate::config::AppConfig;

/// Bind `config.bind` and serve until `shutdown` resolves.
pub async fn serve<F>(config: AppConfig, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.bind).await?;
    serve_on(listener, config, shutdown).await
}

/// Serve on an already-bound listener. Port 0 binds are used in tests.
pub async fn serve_on<F>(
    listener: TcpListener,
    config: AppConfig,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = listener.local_addr()?;
    let app = app_router(Arc::new(config));

    tracing::info!(%addr, "Upload server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("Upload server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
