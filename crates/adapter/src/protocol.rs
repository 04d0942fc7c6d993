//! Protocol module - JSON message types for the session
//!
//! Line-delimited JSON. Every line carries a `type`; client lines may carry a
//! `seq` that is echoed back in the matching ack or error.

use serde::{Deserialize, Serialize};

use tile_link_core::GameSnapshot;

use crate::types::{GameStatus, PlayerCommand, Position, Tile};

// ============== Client -> Game Messages ==============

/// Command payload, tagged by `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireCommand {
    Select {
        x: i32,
        y: i32,
    },
    Hint,
    Shuffle,
    Restart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        carry_score: Option<u32>,
    },
    NextLevel,
}

impl From<WireCommand> for PlayerCommand {
    fn from(cmd: WireCommand) -> Self {
        match cmd {
            WireCommand::Select { x, y } => PlayerCommand::Select { x, y },
            WireCommand::Hint => PlayerCommand::Hint,
            WireCommand::Shuffle => PlayerCommand::Shuffle,
            WireCommand::Restart { level, carry_score } => {
                PlayerCommand::Restart { level, carry_score }
            }
            WireCommand::NextLevel => PlayerCommand::NextLevel,
        }
    }
}

/// One client line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(default)]
    pub seq: u64,
    #[serde(flatten)]
    pub command: WireCommand,
}

/// Parse a client line
pub fn parse_message(json: &str) -> Result<CommandMessage, serde_json::Error> {
    serde_json::from_str(json)
}

/// Best-effort `seq` of a line that failed to parse, so the error can echo it
pub fn extract_seq(json: &str) -> u64 {
    #[derive(Deserialize)]
    struct SeqOnly {
        seq: Option<u64>,
    }
    serde_json::from_str::<SeqOnly>(json)
        .ok()
        .and_then(|s| s.seq)
        .unwrap_or(0)
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "invalid_command")]
    InvalidCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusView {
    Playing,
    Victory,
    GameOver,
}

impl From<GameStatus> for StatusView {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Playing => StatusView::Playing,
            GameStatus::Victory => StatusView::Victory,
            GameStatus::GameOver => StatusView::GameOver,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionView {
    pub x: i32,
    pub y: i32,
}

impl From<Position> for PositionView {
    fn from(pos: Position) -> Self {
        Self { x: pos.x, y: pos.y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    pub id: u32,
    pub category: u16,
    pub item: u16,
    pub label: String,
    pub icon: String,
}

impl From<&Tile> for TileView {
    fn from(tile: &Tile) -> Self {
        Self {
            id: tile.id,
            category: tile.key.category,
            item: tile.key.item,
            label: tile.label.to_string(),
            icon: tile.icon.to_string(),
        }
    }
}

/// Full game view, sent after every state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub width: usize,
    pub height: usize,
    /// Rows top to bottom; `null` marks an empty cell
    pub board: Vec<Vec<Option<TileView>>>,
    pub selected: Option<PositionView>,
    pub path: Vec<PositionView>,
    pub score: u32,
    pub time_remaining: u32,
    pub level: u32,
    pub status: StatusView,
    pub message: String,
    pub playable: bool,
    pub episode_id: u32,
    pub remaining_tiles: usize,
    pub reshuffles: u32,
}

/// Result of one client command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub command: String,
    /// False when the command was legal JSON but had no effect
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Any line the session writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Observation(ObservationMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
}

impl ServerMessage {
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============== Utility Functions ==============

/// Build an observation from a snapshot
pub fn build_observation(seq: u64, snap: &GameSnapshot) -> ObservationMessage {
    let board = (0..snap.height)
        .map(|y| {
            (0..snap.width)
                .map(|x| snap.cells[y * snap.width + x].as_ref().map(TileView::from))
                .collect()
        })
        .collect();

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        width: snap.width,
        height: snap.height,
        board,
        selected: snap.selected.map(PositionView::from),
        path: snap.path.iter().copied().map(PositionView::from).collect(),
        score: snap.score,
        time_remaining: snap.time_remaining,
        level: snap.level,
        status: snap.status.into(),
        message: snap.message.clone(),
        playable: snap.playable(),
        episode_id: snap.episode_id,
        remaining_tiles: snap.remaining_tiles,
        reshuffles: snap.reshuffles,
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64, command: PlayerCommand, changed: bool) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        command: command.as_str().to_string(),
        changed,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
