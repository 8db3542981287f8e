//! Proxy server lifecycle: bind → spawn background task → return a handle
//! with a shutdown channel.

use crate::config::ProxyConfig;
use crate::error::DocSageError;
use crate::proxy::proxy_router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Handle to a running proxy server.
pub struct ProxyServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ProxyServer {
    /// Bind `config.bind_addr` and start serving in the background.
    ///
    /// Bind to port 0 to let the OS pick a free port; read it back with
    /// [`ProxyServer::local_addr`].
    pub async fn start(config: ProxyConfig) -> Result<Self, DocSageError> {
        let bind_addr = config.bind_addr.clone();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| DocSageError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| DocSageError::Bind {
                addr: bind_addr,
                source,
            })?;

        let upstream = config.upstream_url.clone();
        let app = proxy_router(config)?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let shutdown_signal = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal)
                .await
            {
                error!("Proxy server error: {e}");
            }
        });

        info!(addr = %local_addr, upstream = %upstream, "Proxy server started");

        Ok(Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL clients should use, e.g. `http://127.0.0.1:3000`.
    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Ask the server to stop accepting connections and drain.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("Proxy server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish.
    pub async fn join(mut self) -> Result<(), DocSageError> {
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| DocSageError::Internal(format!("Proxy server task failed: {e}"))),
            None => Ok(()),
        }
    }
}

impl Drop for ProxyServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run the proxy until Ctrl-C, then shut down gracefully.
pub async fn serve(config: ProxyConfig) -> Result<(), DocSageError> {
    let mut server = ProxyServer::start(config).await?;
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
    }
    server.shutdown();
    server.join().await
}
