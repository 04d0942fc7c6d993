//! Deadlock detection - is any move left on the board?
//!
//! Occupied tiles are enumerated in row-major order and every same-key pair
//! `(i, j)` with `i < j` is tried with [`connect`]. The first connectible pair
//! ends the scan. The worst case is quadratic in the number of tiles, which is
//! fine for boards of up to a few hundred cells.

use crate::board::Board;
use crate::connect::{connect, Path};
use crate::types::{PairKey, Position};

/// A legal match: two tiles and the path linking them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub path: Path,
}

/// First connectible pair in row-major enumeration order
pub fn find_move(board: &Board) -> Option<Move> {
    let tiles: Vec<(Position, PairKey)> = board.tiles().map(|(pos, t)| (pos, t.key)).collect();

    for (i, &(from, key)) in tiles.iter().enumerate() {
        for &(to, other) in &tiles[i + 1..] {
            if key != other {
                continue;
            }
            if let Some(path) = connect(board, from, to) {
                return Some(Move { from, to, path });
            }
        }
    }

    None
}

/// True iff at least one same-key pair can be linked
pub fn has_moves(board: &Board) -> bool {
    find_move(board).is_some()
}
