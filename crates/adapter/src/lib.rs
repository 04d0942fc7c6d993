//! Adapter - async host for the tile-link engine
//!
//! The core crate never touches a clock or a socket. This crate gives it
//! both: a [`Session`] owns one [`GameState`](tile_link_core::GameState),
//! turns its effects into tokio timers and background requests, and talks to
//! a client over a line-delimited JSON protocol.
//!
//! # Protocol Overview
//!
//! Client -> game (one JSON object per line, `seq` optional):
//!
//! - `{"type":"select","seq":1,"x":2,"y":3}`: click a tile
//! - `{"type":"hint"}`: highlight a connectible pair
//! - `{"type":"shuffle"}`: reshuffle for a 50 point penalty
//! - `{"type":"restart","level":2,"carry_score":300}`: start over (fields optional)
//! - `{"type":"next_level"}`: continue after a victory
//!
//! Game -> client:
//!
//! - **observation**: full board, selection, path, score, clock and status,
//!   sent after every state change
//! - **ack**: one per command, with `changed: false` when it was a no-op
//! - **error**: `invalid_command` for lines that do not parse
//!
//! # Example Protocol Flow
//!
//! ```text
//! Game   -> Client: {"type":"observation","seq":1,"ts":...,"width":6,"height":8,"board":[...],"status":"playing",...}
//! Client -> Game:   {"type":"select","seq":1,"x":0,"y":0}
//! Game   -> Client: {"type":"ack","seq":1,"ts":...,"command":"select","changed":true}
//! Game   -> Client: {"type":"observation","seq":2,...,"selected":{"x":0,"y":0},...}
//! ```
//!
//! # Environment Variables
//!
//! See [`config`] for the `TILE_LINK_*` variables.

pub mod config;
pub mod message;
pub mod protocol;
pub mod server;
pub mod session;

pub use tile_link_core as core;
pub use tile_link_types as types;

// Re-export protocol types for convenience
pub use config::SessionConfig;
pub use message::{resolve_with_fallback, CannedMessages, ClosingMessageSource};
pub use protocol::*;
pub use server::serve;
pub use session::Session;
