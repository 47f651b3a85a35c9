//! TCP Listener and Dispatcher
//!
//! Owns the listening socket, the store and the statistics registry. Every
//! accepted connection is counted, then handed to its own task; the accept
//! loop goes straight back to waiting for the next client.
//!
//! Accept errors are logged and skipped. The only fatal error is failing to
//! bind in the first place.

use crate::commands::CommandHandler;
use crate::connection::handle_connection;
use crate::stats::{ConnectionGuard, StatisticsRegistry};
use crate::storage::KeyValueStore;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// A bound server, ready to accept connections.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    store: Arc<KeyValueStore>,
    stats: Arc<StatisticsRegistry>,
}

impl Server {
    /// Binds the listening socket with a fresh, empty store.
    ///
    /// Uptime reported by `STATS` is measured from this call.
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            store: Arc::new(KeyValueStore::new()),
            stats: Arc::new(StatisticsRegistry::new()),
        })
    }

    /// The address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The shared store.
    pub fn store(&self) -> Arc<KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// The shared statistics registry.
    pub fn stats(&self) -> Arc<StatisticsRegistry> {
        Arc::clone(&self.stats)
    }

    /// Accepts connections forever.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    // Counted before the task exists; the guard uncounts it
                    // when the task finishes, however it finishes.
                    let guard = ConnectionGuard::open(Arc::clone(&self.stats));
                    let handler =
                        CommandHandler::new(Arc::clone(&self.store), Arc::clone(&self.stats));

                    tokio::spawn(async move {
                        let _guard = guard;
                        handle_connection(stream, addr, handler).await;
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}
