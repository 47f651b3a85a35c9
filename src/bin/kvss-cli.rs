//! kvss interactive client
//!
//! Relays lines typed on stdin to the server (prefixed with the version
//! token) and prints every line the server sends back.

use anyhow::Context;
use kvss::protocol::request_line;
use kvss::Config;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    let stream = TcpStream::connect(config.address())
        .await
        .with_context(|| format!("connect error: {}", config.address()))?;
    let (read_half, mut write_half) = stream.into_split();

    println!("[kvss client] connected {}", config.address());
    println!("Type commands without the version token, e.g. PUT name kvss");

    // Server replies are printed as they arrive
    tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            println!("[resp] {}", line);
        }
        println!("[server closed]");
        std::process::exit(0);
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(input) = stdin.next_line().await? else {
            return Ok(());
        };
        let Some(line) = request_line(&input) else {
            continue;
        };

        write_half
            .write_all(line.as_bytes())
            .await
            .context("write error")?;
    }
}
