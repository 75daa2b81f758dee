//! Shared serve entrypoint — used by the binary and by tests.

use crate::{AppState, ServerConfig, TokenAuthenticator, build_runtime, routes};
use anyhow::Result;
use std::sync::Arc;
use store::TranscriptStore;
use tokio::sync::oneshot;

/// Handle returned by [`serve`] — holds the bound port and shutdown trigger.
pub struct ServeHandle {
    /// The port the server is listening on.
    pub port: u16,
    /// Send a value to trigger graceful shutdown.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Join handle for the server task.
    join: Option<tokio::task::JoinHandle<Result<(), std::io::Error>>>,
}

impl ServeHandle {
    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Open the store, build the runtime, bind the axum server, and start
/// serving.
///
/// Returns a [`ServeHandle`] with the bound port and a shutdown trigger.
/// The server runs in a spawned task — call `handle.shutdown()` to stop it.
pub async fn serve(config: &ServerConfig) -> Result<ServeHandle> {
    let store = Arc::new(TranscriptStore::open(config.database_path())?);
    tracing::info!("transcript store at {}", config.database_path());

    let runtime = Arc::new(build_runtime(config)?);
    let authenticator = Arc::new(TokenAuthenticator::from_config(&config.auth));

    let state = AppState {
        runtime,
        store,
        authenticator,
    };

    let app = routes::router(state);
    let bind = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("listening on {bind} (port {port})");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("received shutdown signal");
            })
            .await
    });

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}
