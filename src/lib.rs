//! # kvss - A Minimal Networked Key-Value Store
//!
//! kvss keeps string values by string key in a single in-memory map and
//! serves them over TCP with a line-oriented text protocol (`KV/1.0`).
//!
//! ## Features
//!
//! - **Line Protocol**: `KV/1.0 <COMMAND> [arg1] [arg2]`, one reply line per request
//! - **Linearizable Operations**: one map behind one `RwLock`
//! - **Statistics**: connection, request and per-command counters via `STATS`
//! - **Async I/O**: Built on Tokio, one task per client connection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                kvss                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │   Server    │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │                     ┌─────────────┐   ┌───────────────┐ ┌────────────┐  │
//! │                     │ Line Parser │   │ KeyValueStore │ │ Statistics │  │
//! │                     └─────────────┘   │  (RwLock)     │ │  (Mutex)   │  │
//! │                                       └───────────────┘ └────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use kvss::Server;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let server = Server::bind(kvss::DEFAULT_ADDR).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol
//!
//! ```text
//! > KV/1.0 PUT name kvss      < 201 CREATED
//! > KV/1.0 GET name           < 200 OK kvss
//! > KV/1.0 DEL name           < 204 NO_CONTENT
//! > KV/1.0 GET name           < 404 NOT_FOUND
//! > KV/1.0 STATS              < 200 OK {"version":"KV/1.0",...}
//! > KV/1.0 QUIT               < 200 OK bye
//! ```
//!
//! Keys and values cannot contain whitespace. There is no persistence,
//! expiry, authentication or replication.
//!
//! ## Module Overview
//!
//! - [`protocol`]: Line framing, request parsing and response rendering
//! - [`storage`]: The shared key-value map
//! - [`stats`]: Counters reported by `STATS`
//! - [`commands`]: Executes requests against storage and statistics
//! - [`connection`]: Per-client read/execute/respond loop
//! - [`server`]: Listener and per-connection task dispatch
//! - [`config`]: The address argument

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod stats;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{CommandError, CommandHandler};
pub use config::Config;
pub use connection::{handle_connection, ConnectionError, ConnectionHandler};
pub use protocol::{ProtocolError, Request, Response};
pub use server::Server;
pub use stats::{ConnectionGuard, StatisticsRegistry, StatsSnapshot};
pub use storage::KeyValueStore;

/// The version token every request line must start with
pub const PROTOCOL_VERSION: &str = "KV/1.0";

/// The default address the server binds to and the client connects to
pub const DEFAULT_ADDR: &str = "127.0.0.1:5050";

/// Version of kvss
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
