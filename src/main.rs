//! kvss server
//!
//! Binds the listener on the address given as the first argument (or the
//! default) and serves clients until Ctrl+C.

use anyhow::Context;
use kvss::{Config, Server};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

fn print_banner(config: &Config) {
    println!(
        r#"
kvss v{} - Minimal Networked Key-Value Store ({})
──────────────────────────────────────────────────────────────
Server starting on {}

Use Ctrl+C to shutdown.
"#,
        kvss::VERSION,
        kvss::PROTOCOL_VERSION,
        config.address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    // Set up logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    print_banner(&config);

    // Failing to bind is the only fatal error
    let server = Server::bind(config.address())
        .await
        .with_context(|| format!("failed to bind {}", config.address()))?;

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, stopping server..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = server.run() => {}
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}
