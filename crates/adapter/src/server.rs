//! Line-stream server
//!
//! Connects a [`Session`] to any byte stream pair: client lines are read
//! from `reader`, every message the session produces is written to `writer`
//! as one JSON line. The binary uses stdin/stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use tile_link_core::GameSnapshot;

use crate::config::SessionConfig;
use crate::message::ClosingMessageSource;
use crate::session::Session;

/// Bound on client lines waiting for the session
pub const MAX_PENDING_LINES: usize = 64;

/// Play one session over a line stream until the reader reaches EOF.
///
/// Returns the final snapshot once every queued message has been written.
pub async fn serve<S, R, W>(
    config: &SessionConfig,
    source: Arc<S>,
    reader: R,
    mut writer: W,
) -> Result<GameSnapshot>
where
    S: ClosingMessageSource,
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (session, mut out_rx) =
        Session::from_config(config, source).context("building the game board")?;
    info!(
        width = config.game.width,
        height = config.game.height,
        seed = config.seed,
        "session starting"
    );

    let (line_tx, line_rx) = mpsc::channel::<String>(MAX_PENDING_LINES);

    let reader_task = tokio::spawn(async move {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line_tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "client stream failed");
                    break;
                }
            }
        }
    });

    let writer_task = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let mut line = msg.to_line().context("encoding message")?;
            line.push('\n');
            writer
                .write_all(line.as_bytes())
                .await
                .context("writing message")?;
            writer.flush().await.context("flushing output")?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let snapshot = session.run(line_rx).await;

    // The session is gone, so the writer drains and stops on its own.
    writer_task.await.context("writer task panicked")??;
    reader_task.abort();

    Ok(snapshot)
}
