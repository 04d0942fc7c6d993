//! End-to-end session tests: commands in, observations out, with the tokio
//! clock paused so ticks and delayed effects run instantly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use tile_link::adapter::{
    CannedMessages, ClosingMessageSource, ObservationMessage, ServerMessage, Session, StatusView,
};
use tile_link::core::{Board, GameConfig, GameState};
use tile_link::types::{FALLBACK_CLOSING_MESSAGE, TIME_UP_MESSAGE};

struct Failing;

impl ClosingMessageSource for Failing {
    async fn closing_message(&self, _score: u32, _level: u32) -> anyhow::Result<String> {
        anyhow::bail!("generator offline")
    }
}

struct Stalled;

impl ClosingMessageSource for Stalled {
    async fn closing_message(&self, _score: u32, _level: u32) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("never shown".to_string())
    }
}

struct Fixed(&'static str);

impl ClosingMessageSource for Fixed {
    async fn closing_message(&self, _score: u32, _level: u32) -> anyhow::Result<String> {
        Ok(self.0.to_string())
    }
}

struct Harness {
    tx: mpsc::Sender<String>,
    out: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Harness {
    fn start<S: ClosingMessageSource>(rows: &[&str], config: GameConfig, source: S) -> Self {
        let board = Board::from_rows(rows).unwrap();
        let state = GameState::with_board(&config, 17, board).unwrap();
        let (session, out) = Session::new(state, Arc::new(source), Duration::from_secs(5));
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(session.run(rx));
        Self { tx, out }
    }

    async fn send(&self, line: &str) {
        self.tx.send(line.to_string()).await.unwrap();
    }

    async fn observation_where<F>(&mut self, mut pred: F) -> ObservationMessage
    where
        F: FnMut(&ObservationMessage) -> bool,
    {
        loop {
            match self.out.recv().await {
                Some(ServerMessage::Observation(obs)) if pred(&obs) => return obs,
                Some(_) => continue,
                None => panic!("session closed before the expected observation"),
            }
        }
    }

    async fn clear_board(&mut self) {
        for (x, y) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            self.send(&format!(r#"{{"type":"select","x":{x},"y":{y}}}"#))
                .await;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_victory_shows_closing_message() {
    let mut h = Harness::start(&["AB", "AB"], GameConfig::default(), Fixed("Nicely done"));
    h.clear_board().await;

    let obs = h
        .observation_where(|o| o.status == StatusView::Victory && !o.message.is_empty())
        .await;
    assert_eq!(obs.message, "Nicely done");
    assert_eq!(obs.score, 320);
    assert_eq!(obs.remaining_tiles, 0);
    assert!(!obs.playable);
}

#[tokio::test(start_paused = true)]
async fn test_failed_message_uses_fallback() {
    let mut h = Harness::start(&["AB", "AB"], GameConfig::default(), Failing);
    h.clear_board().await;

    let obs = h
        .observation_where(|o| o.status == StatusView::Victory && !o.message.is_empty())
        .await;
    assert_eq!(obs.message, FALLBACK_CLOSING_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_message_times_out() {
    let mut h = Harness::start(&["AB", "AB"], GameConfig::default(), Stalled);
    h.clear_board().await;

    let obs = h
        .observation_where(|o| o.status == StatusView::Victory && !o.message.is_empty())
        .await;
    assert_eq!(obs.message, FALLBACK_CLOSING_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn test_victory_stops_the_clock() {
    let mut h = Harness::start(&["AB", "AB"], GameConfig::default(), CannedMessages::default());
    h.clear_board().await;
    let won = h
        .observation_where(|o| o.status == StatusView::Victory && !o.message.is_empty())
        .await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    h.send(r#"{"type":"hint","seq":5}"#).await;
    loop {
        match h.out.recv().await.unwrap() {
            ServerMessage::Observation(obs) => assert_eq!(obs.time_remaining, won.time_remaining),
            ServerMessage::Ack(ack) => {
                assert_eq!(ack.seq, 5);
                assert!(!ack.changed);
                break;
            }
            ServerMessage::Error(err) => panic!("unexpected error {err:?}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_clock_ends_the_game() {
    let config = GameConfig {
        initial_time_secs: 3,
        ..GameConfig::default()
    };
    // Level clocks never start below 30 seconds.
    let mut h = Harness::start(&["AB", "BA"], config, CannedMessages::default());

    let obs = h
        .observation_where(|o| o.status == StatusView::GameOver)
        .await;
    assert_eq!(obs.time_remaining, 0);
    assert_eq!(obs.message, TIME_UP_MESSAGE);
    assert_eq!(obs.score, 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_the_clock() {
    let mut h = Harness::start(&["AB", "AB"], GameConfig::default(), CannedMessages::default());
    h.observation_where(|o| o.time_remaining == 115).await;

    h.send(r#"{"type":"restart","level":2,"carry_score":10}"#).await;
    let fresh = h.observation_where(|o| o.episode_id == 1).await;
    assert_eq!(fresh.time_remaining, 110);
    assert_eq!(fresh.score, 10);
    assert_eq!(fresh.level, 2);

    // One clock only: exactly one second per tick from here on.
    let mut last = fresh.time_remaining;
    for _ in 0..5 {
        let obs = h.observation_where(|o| o.time_remaining != last).await;
        assert_eq!(obs.episode_id, 1);
        assert_eq!(obs.time_remaining, last - 1);
        last = obs.time_remaining;
    }
}

#[tokio::test(start_paused = true)]
async fn test_hint_path_appears_and_clears() {
    let mut h = Harness::start(&["AB", "AB"], GameConfig::default(), CannedMessages::default());
    h.send(r#"{"type":"hint"}"#).await;

    let selected = h.observation_where(|o| o.selected.is_some()).await;
    assert!(selected.path.is_empty());

    let shown = h.observation_where(|o| !o.path.is_empty()).await;
    assert_eq!(shown.path.first(), selected.selected.as_ref());

    let cleared = h
        .observation_where(|o| o.path.is_empty() && o.selected.is_none())
        .await;
    assert_eq!(cleared.score, 0);
    assert_eq!(cleared.remaining_tiles, 4);
}

#[tokio::test(start_paused = true)]
async fn test_match_path_is_cleared() {
    let mut h = Harness::start(&["AB", "AB"], GameConfig::default(), CannedMessages::default());
    h.send(r#"{"type":"select","x":0,"y":0}"#).await;
    h.send(r#"{"type":"select","x":0,"y":1}"#).await;

    let matched = h.observation_where(|o| o.remaining_tiles == 2).await;
    assert_eq!(matched.path.len(), 2);
    let cleared = h.observation_where(|o| o.path.is_empty()).await;
    assert_eq!(cleared.remaining_tiles, 2);
}

#[tokio::test(start_paused = true)]
async fn test_bad_line_gets_error() {
    let mut h = Harness::start(&["AB", "AB"], GameConfig::default(), CannedMessages::default());
    h.send(r#"{"type":"teleport","seq":8}"#).await;

    loop {
        match h.out.recv().await.unwrap() {
            ServerMessage::Error(err) => {
                assert_eq!(err.seq, 8);
                let v = serde_json::to_value(&err).unwrap();
                assert_eq!(v["code"], "invalid_command");
                break;
            }
            _ => continue,
        }
    }
}
