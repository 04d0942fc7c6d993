//! Headless tile-link runner (default binary).
//!
//! Reads JSON command lines on stdin and writes observation/ack/error lines
//! on stdout. Logs go to stderr; set `RUST_LOG` to change the level.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tile_link::adapter::{serve, CannedMessages, SessionConfig};
use tile_link::types::GameStatus;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SessionConfig::from_env().context("loading configuration")?;

    let snapshot = serve(
        &config,
        Arc::new(CannedMessages::default()),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    info!(
        score = snapshot.score,
        level = snapshot.level,
        status = snapshot.status.as_str(),
        cleared = snapshot.status == GameStatus::Victory,
        "goodbye"
    );
    Ok(())
}
