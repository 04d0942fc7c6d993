//! Session runtime - owns the game and carries out its effects.
//!
//! One tokio task drives a [`GameState`]: it applies client lines, runs the
//! single tick schedule, fires delayed one-shot commands and resolves the
//! closing message. Every state change is published as an observation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use tile_link_core::{Effect, GameSnapshot, GameState, Scheduled};

use crate::config::SessionConfig;
use crate::message::{resolve_with_fallback, ClosingMessageSource};
use crate::protocol::{
    build_observation, create_ack, create_error, extract_seq, parse_message, ErrorCode,
    ServerMessage,
};
use crate::types::PlayerCommand;

/// Work fed back into the session by its own background tasks
#[derive(Debug)]
enum Internal {
    Scheduled(Scheduled),
    ClosingMessage { episode: u32, text: Option<String> },
}

pub struct Session<S> {
    state: GameState,
    source: Arc<S>,
    message_timeout: Duration,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    ticker: Option<JoinHandle<()>>,
    out_tx: mpsc::UnboundedSender<ServerMessage>,
    seq: u64,
    snapshot: GameSnapshot,
}

impl<S: ClosingMessageSource> Session<S> {
    /// Wrap a game; messages written by the session arrive on the returned receiver
    pub fn new(
        state: GameState,
        source: Arc<S>,
        message_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let session = Self {
            state,
            source,
            message_timeout,
            internal_tx,
            internal_rx,
            ticker: None,
            out_tx,
            seq: 0,
            snapshot: GameSnapshot::default(),
        };
        (session, out_rx)
    }

    /// Build a fresh game from configuration
    pub fn from_config(
        config: &SessionConfig,
        source: Arc<S>,
    ) -> anyhow::Result<(Self, mpsc::UnboundedReceiver<ServerMessage>)> {
        let state = GameState::new(&config.game, config.seed)?;
        Ok(Self::new(state, source, config.message_timeout))
    }

    /// Run until the client line stream closes; returns the final snapshot
    pub async fn run(mut self, mut lines: mpsc::Receiver<String>) -> GameSnapshot {
        self.state.start();
        self.dispatch_effects();
        self.publish();

        loop {
            tokio::select! {
                line = lines.recv() => match line {
                    Some(line) => self.handle_line(&line),
                    None => break,
                },
                Some(internal) = self.internal_rx.recv() => self.handle_internal(internal),
            }
        }

        self.stop_ticker();
        info!(
            episode = self.state.episode_id(),
            score = self.state.score(),
            "session closed"
        );
        self.state.snapshot()
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let msg = match parse_message(line) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(error = %err, "rejected client line");
                let error = create_error(extract_seq(line), ErrorCode::InvalidCommand, &err.to_string());
                self.send(ServerMessage::Error(error));
                return;
            }
        };

        let command = PlayerCommand::from(msg.command);
        let changed = self.state.apply_command(command);
        self.send(ServerMessage::Ack(create_ack(msg.seq, command, changed)));
        if changed {
            self.dispatch_effects();
            self.publish();
        }
    }

    fn handle_internal(&mut self, internal: Internal) {
        let changed = match internal {
            Internal::Scheduled(event) => self.state.apply_scheduled(event),
            Internal::ClosingMessage { episode, text } => {
                self.state.resolve_closing_message(episode, text)
            }
        };
        if changed {
            self.dispatch_effects();
            self.publish();
        }
    }

    fn dispatch_effects(&mut self) {
        for effect in self.state.take_effects() {
            match effect {
                Effect::StartTicking { episode, period_ms } => {
                    self.start_ticker(episode, period_ms);
                }
                Effect::StopTicking { episode } => {
                    debug!(episode, "clock stopped");
                    self.stop_ticker();
                }
                Effect::Schedule { delay_ms, event } => {
                    let tx = self.internal_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
                        let _ = tx.send(Internal::Scheduled(event));
                    });
                }
                Effect::RequestClosingMessage {
                    episode,
                    score,
                    level,
                } => {
                    info!(episode, score, level, "requesting closing message");
                    let tx = self.internal_tx.clone();
                    let source = Arc::clone(&self.source);
                    let timeout = self.message_timeout;
                    tokio::spawn(async move {
                        let text = resolve_with_fallback(source.as_ref(), score, level, timeout).await;
                        let _ = tx.send(Internal::ClosingMessage { episode, text });
                    });
                }
            }
        }
    }

    /// Replace the running clock, if any
    fn start_ticker(&mut self, episode: u32, period_ms: u32) {
        self.stop_ticker();
        let tx = self.internal_tx.clone();
        let period = Duration::from_millis(period_ms.max(1) as u64);
        debug!(episode, period_ms, "clock started");
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(Internal::Scheduled(Scheduled::Tick { episode })).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn publish(&mut self) {
        self.state.snapshot_into(&mut self.snapshot);
        let seq = self.next_seq();
        let obs = build_observation(seq, &self.snapshot);
        self.send(ServerMessage::Observation(obs));
    }

    fn send(&mut self, msg: ServerMessage) {
        let _ = self.out_tx.send(msg);
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::CannedMessages;
    use crate::protocol::{ObservationMessage, StatusView};
    use tile_link_core::{Board, GameConfig};

    fn session(rows: &[&str]) -> (Session<CannedMessages>, mpsc::UnboundedReceiver<ServerMessage>) {
        let board = Board::from_rows(rows).unwrap();
        let state = GameState::with_board(&GameConfig::default(), 5, board).unwrap();
        Session::new(state, Arc::new(CannedMessages::default()), Duration::from_secs(5))
    }

    async fn next_observation(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> ObservationMessage {
        loop {
            match rx.recv().await.expect("session hung up") {
                ServerMessage::Observation(obs) => return obs,
                _ => continue,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_observation() {
        let (session, mut out) = session(&["AB", "AB"]);
        let (_tx, rx) = mpsc::channel(8);
        tokio::spawn(session.run(rx));

        let obs = next_observation(&mut out).await;
        assert_eq!(obs.status, StatusView::Playing);
        assert_eq!(obs.time_remaining, 120);
        assert_eq!(obs.remaining_tiles, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_is_acked() {
        let (session, mut out) = session(&["AB", "AB"]);
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(session.run(rx));
        next_observation(&mut out).await;

        tx.send(r#"{"type":"select","seq":1,"x":0,"y":0}"#.to_string())
            .await
            .unwrap();
        match out.recv().await.unwrap() {
            ServerMessage::Ack(ack) => {
                assert_eq!(ack.seq, 1);
                assert_eq!(ack.command, "select");
                assert!(ack.changed);
            }
            other => panic!("expected ack, got {other:?}"),
        }
        let obs = next_observation(&mut out).await;
        assert!(obs.selected.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_returns_final_snapshot() {
        let (session, _out) = session(&["AB", "AB"]);
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(session.run(rx));
        drop(tx);
        let snap = handle.await.unwrap();
        assert_eq!(snap.remaining_tiles, 4);
    }
}
