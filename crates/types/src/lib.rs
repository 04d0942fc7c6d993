//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be used
//! by the engine, the async session host and the wire protocol alike.
//!
//! # Board Dimensions
//!
//! The default board is 6 columns by 8 rows. Any size works as long as
//! `width * height` is even, since every tile needs a partner.
//!
//! Coordinates are `(x, y)` with `x` growing to the right and `y` growing
//! downwards. The ring of cells at `x = -1`, `x = width`, `y = -1` and
//! `y = height` is the virtual frame: always empty, usable by paths, never
//! holding a tile.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 1000 | One clock tick removes one second |
//! | `PATH_CLEAR_MS` | 300 | Match highlight lifetime |
//! | `HINT_SHOW_MS` | 500 | Delay before a hint path is drawn |
//! | `HINT_CLEAR_MS` | 1500 | Delay before a hint is cleared |
//!
//! # Examples
//!
//! ```
//! use tile_link_types::{Direction, GameStatus, Position};
//!
//! let p = Position::new(2, 3);
//! assert_eq!(p.step(Direction::East), Position::new(3, 3));
//! assert_eq!(Direction::North.opposite(), Direction::South);
//! assert!(GameStatus::Victory.is_terminal());
//! ```

use std::fmt;
use std::sync::Arc;

/// Default board width in cells
pub const DEFAULT_GRID_WIDTH: usize = 6;

/// Default board height in cells
pub const DEFAULT_GRID_HEIGHT: usize = 8;

/// Clock at the start of level 1, in seconds
pub const DEFAULT_INITIAL_TIME_SECS: u32 = 120;

/// Lowest clock any level starts with
pub const MIN_LEVEL_TIME_SECS: u32 = 30;

/// Seconds removed from the starting clock per level after the first
pub const LEVEL_TIME_STEP_SECS: u32 = 10;

/// Clock tick period in milliseconds
pub const TICK_MS: u32 = 1000;

/// How long a matched path stays visible
pub const PATH_CLEAR_MS: u32 = 300;

/// Delay between selecting the hinted tile and drawing the hint path
pub const HINT_SHOW_MS: u32 = 500;

/// Delay between requesting a hint and clearing it again
pub const HINT_CLEAR_MS: u32 = 1500;

/// Flat points for every match (a time bonus is added on top)
pub const MATCH_BASE_SCORE: u32 = 100;

/// Points deducted for a manual shuffle
pub const SHUFFLE_PENALTY: u32 = 50;

/// Maximum direction changes allowed in a connecting path
pub const MAX_TURNS: u8 = 2;

/// Shown when the closing message could not be produced
pub const FALLBACK_CLOSING_MESSAGE: &str =
    "Board cleared! Sharp eyes and quick hands. See you on the next level!";

/// Shown when the clock runs out
pub const TIME_UP_MESSAGE: &str = "Time's up!";

/// Grid coordinate. Signed so the virtual frame around the board is addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring position one step in `dir`
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Orthogonal travel direction
///
/// The declaration order (East, South, West, North) is the order the path
/// search tries directions in, which makes tie-breaking deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    /// All directions in search order
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// `(dx, dy)` unit offset
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::North => Direction::South,
        }
    }

    /// Stable index (0..4) for table lookups
    pub fn index(self) -> usize {
        match self {
            Direction::East => 0,
            Direction::South => 1,
            Direction::West => 2,
            Direction::North => 3,
        }
    }
}

/// Matching key: two tiles match iff their keys are equal.
///
/// Indices point into the theme catalog the board was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub category: u16,
    pub item: u16,
}

impl PairKey {
    pub const fn new(category: u16, item: u16) -> Self {
        Self { category, item }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category, self.item)
    }
}

/// A tile on the board
///
/// `label` and `icon` are cosmetic and never inspected by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: u32,
    pub key: PairKey,
    pub label: Arc<str>,
    pub icon: Arc<str>,
}

impl Tile {
    pub fn new(id: u32, key: PairKey, label: impl Into<Arc<str>>, icon: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            key,
            label: label.into(),
            icon: icon.into(),
        }
    }

    /// Whether two tiles can be linked (same pair key)
    pub fn matches(&self, other: &Tile) -> bool {
        self.key == other.key
    }
}

/// A board cell: a tile or nothing
pub type Cell = Option<Tile>;

/// Lifecycle status of a game
///
/// `Victory` and `GameOver` are terminal; only a restart leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    #[default]
    Playing,
    Victory,
    GameOver,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Playing)
    }

    /// snake_case name used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Playing => "playing",
            GameStatus::Victory => "victory",
            GameStatus::GameOver => "game_over",
        }
    }
}

/// Commands a player (or rendering front end) can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Click the tile at `(x, y)`
    Select { x: i32, y: i32 },
    /// Ask for a connectible pair to be highlighted
    Hint,
    /// Reshuffle the remaining tiles for a score penalty
    Shuffle,
    /// Start over; missing fields default to level 1 and score 0
    Restart {
        level: Option<u32>,
        carry_score: Option<u32>,
    },
    /// After a victory, start the next level keeping the score
    NextLevel,
}

impl PlayerCommand {
    /// snake_case name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerCommand::Select { .. } => "select",
            PlayerCommand::Hint => "hint",
            PlayerCommand::Shuffle => "shuffle",
            PlayerCommand::Restart { .. } => "restart",
            PlayerCommand::NextLevel => "next_level",
        }
    }
}
