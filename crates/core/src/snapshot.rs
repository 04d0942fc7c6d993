use crate::types::{Cell, GameStatus, Position, Tile};

/// Read-only view of a game handed to renderers and the wire protocol.
///
/// `snapshot_into` refills an existing value so hosts can reuse the buffers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major cells
    pub cells: Vec<Cell>,
    pub selected: Option<Position>,
    /// Transient highlight; empty when nothing is shown
    pub path: Vec<Position>,
    pub score: u32,
    pub time_remaining: u32,
    pub level: u32,
    pub status: GameStatus,
    pub message: String,
    pub episode_id: u32,
    pub remaining_tiles: usize,
    pub reshuffles: u32,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Cell at `(x, y)`; None when empty or outside the grid
    pub fn cell(&self, pos: Position) -> Option<&Tile> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.height {
            return None;
        }
        self.cells[pos.y as usize * self.width + pos.x as usize].as_ref()
    }
}
