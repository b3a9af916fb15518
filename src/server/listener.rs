use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::{Config, ServerSettings};
use crate::error::ServerError;
use crate::http::connection::Connection;

/// Pause after a failed accept, so that running out of descriptors does
/// not turn the loop into a busy spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections and runs each one in its own task.
#[derive(Debug)]
pub struct Listener {
    settings: ServerSettings,
    max_connections: usize,
    listener: Option<TcpListener>,
}

impl Listener {
    pub fn new(cfg: &Config) -> Self {
        Self {
            settings: cfg.settings(),
            max_connections: cfg.server.max_connections,
            listener: None,
        }
    }

    /// Binds the listening socket. Port `0` picks a free port; the bound
    /// address is returned.
    pub async fn bind(&mut self, addr: &str) -> Result<SocketAddr, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::PortUnavailable {
                addr: addr.to_string(),
                source,
            })?;

        let local = listener.local_addr()?;
        info!("Listening on {}", local);
        info!(root = %self.settings.root_folder.display(), "Serving virtual hosts");

        self.listener = Some(listener);
        Ok(local)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Accept loop. At most `max_connections` connections are served at
    /// once; the rest wait to be accepted.
    pub async fn run(&self) -> Result<(), ServerError> {
        let Some(listener) = &self.listener else {
            error!("run() called before bind()");
            return Err(ServerError::NotBound);
        };

        let permits = Arc::new(Semaphore::new(self.max_connections));

        loop {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                return Ok(());
            };

            let (socket, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            info!("Accepted connection from {}", peer);

            let settings = self.settings.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let mut conn = Connection::new(socket, settings);
                if let Err(e) = conn.run().await {
                    warn!(%peer, error = %e, "Connection closed without a response");
                }
            });
        }
    }
}
