//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds every rule of the tile-link puzzle. It does no I/O and
//! owns no timers: hosts feed it clicks and clock ticks and carry out the
//! [`Effect`]s it queues.
//!
//! - **Deterministic**: the same seed generates and reshuffles identically
//! - **Testable**: boards can be written as text with [`Board::from_rows`]
//!
//! # Module Structure
//!
//! - [`board`]: tile grid with a virtual one-cell frame
//! - [`theme`]: category/item catalog the tiles are drawn from
//! - [`generator`]: fully populated boards of random pairs
//! - [`connect`]: bounded-turn path search between two tiles
//! - [`deadlock`]: is any move left?
//! - [`reshuffle`]: redistribute the remaining tiles
//! - [`scoring`]: match points, shuffle penalty, level clock
//! - [`game_state`]: selection, matching, timing, hints, win/loss
//! - [`rng`]: small seedable LCG
//!
//! # Game Rules
//!
//! - Two tiles with the same pair key match when an orthogonal path with at
//!   most two bends links them through empty cells or around the board edge
//! - A match scores `100 + time_remaining / 2`
//! - Clearing the board wins; the clock reaching zero loses
//! - A board with no moves left after a match is reshuffled for free; a
//!   manual shuffle costs 50 points
//!
//! # Example
//!
//! ```
//! use tile_link_core::{Board, GameConfig, GameState, SelectOutcome};
//! use tile_link_core::types::{GameStatus, Position};
//!
//! let board = Board::from_rows(&["AB", "AB"]).unwrap();
//! let mut game = GameState::with_board(&GameConfig::default(), 1, board).unwrap();
//! game.start();
//!
//! game.select_tile(Position::new(0, 0));
//! let outcome = game.select_tile(Position::new(0, 1));
//! assert!(matches!(outcome, SelectOutcome::Matched { .. }));
//!
//! game.select_tile(Position::new(1, 0));
//! game.select_tile(Position::new(1, 1));
//! assert_eq!(game.status(), GameStatus::Victory);
//! ```

pub mod board;
pub mod connect;
pub mod deadlock;
pub mod game_state;
pub mod generator;
pub mod reshuffle;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod theme;

pub use tile_link_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError};
pub use connect::{connect, Path};
pub use deadlock::{find_move, has_moves, Move};
pub use game_state::{Effect, GameConfig, GameState, Scheduled, SelectOutcome};
pub use generator::{generate_board, BoardGenerator};
pub use reshuffle::reshuffle;
pub use rng::SimpleRng;
pub use scoring::{apply_shuffle_penalty, level_start_time, match_score};
pub use snapshot::GameSnapshot;
pub use theme::{Category, Theme, ThemeItem};
