use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tzaharon_store::StateStore;

use crate::api::build_router;
use crate::config::ServerConfig;
use crate::error::{io_err, ServerError};

/// Start the server and block the current thread until it exits.
pub fn start_blocking(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Open the store, bind, and serve until ctrl-c.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let store = tzaharon_store::open(&config.store)?;
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    serve(listener, store, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves. In-flight
/// requests are allowed to finish.
pub async fn serve<F>(
    listener: TcpListener,
    store: Arc<dyn StateStore>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().map_err(|e| io_err("local-addr", e))?;
    tracing::info!(%addr, store = %store.describe(), "listening");
    axum::serve(listener, build_router(store))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| io_err("serve", e))?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received ctrl-c, shutting down server"),
        Err(err) => {
            // Without a signal handler the server can only be killed.
            tracing::error!(error = %err, "ctrl-c handler failed");
            std::future::pending::<()>().await;
        }
    }
}

pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
