//! Reshuffle - redistribute the remaining tiles
//!
//! Occupied positions stay occupied and empty cells stay empty; only which
//! tile sits where changes. The result is not checked for deadlocks, so a
//! reshuffled board can still have no legal move.

use crate::board::Board;
use crate::rng::SimpleRng;
use crate::types::Tile;

/// Permute the remaining tiles uniformly over the occupied positions
pub fn reshuffle(board: &mut Board, rng: &mut SimpleRng) {
    let positions: Vec<_> = board.occupied_positions().collect();
    let mut tiles: Vec<Tile> = positions
        .iter()
        .filter_map(|&pos| board.take(pos))
        .collect();

    rng.shuffle(&mut tiles);

    for (pos, tile) in positions.into_iter().zip(tiles) {
        board.set(pos, Some(tile));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadlock::has_moves;
    use crate::types::{PairKey, Position};

    fn key_multiset(board: &Board) -> Vec<PairKey> {
        let mut keys: Vec<_> = board.tiles().map(|(_, t)| t.key).collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_occupied_set_and_keys_preserved() {
        let mut board = Board::from_rows(&["A.BC", "..CB", "D.AD"]).unwrap();
        let before_positions: Vec<Position> = board.occupied_positions().collect();
        let before_keys = key_multiset(&board);

        reshuffle(&mut board, &mut SimpleRng::new(5));

        let after_positions: Vec<Position> = board.occupied_positions().collect();
        assert_eq!(before_positions, after_positions);
        assert_eq!(before_keys, key_multiset(&board));
    }

    #[test]
    fn test_reshuffle_is_seeded() {
        let base = Board::from_rows(&["ABCD", "EFGH", "HGFE", "DCBA"]).unwrap();
        let mut a = base.clone();
        let mut b = base.clone();
        reshuffle(&mut a, &mut SimpleRng::new(77));
        reshuffle(&mut b, &mut SimpleRng::new(77));
        assert_eq!(a, b);
        assert_ne!(a, base, "16 tiles should not all land where they were");
    }

    #[test]
    fn test_reshuffle_can_leave_a_deadlock() {
        // A full 2x2 board with two pairs is deadlocked whenever the pairs
        // sit on the diagonals. Reshuffle must hand such a board back as is.
        let base = Board::from_rows(&["AA", "BB"]).unwrap();
        let deadlocked = (1..500u32).any(|seed| {
            let mut board = base.clone();
            reshuffle(&mut board, &mut SimpleRng::new(seed));
            !has_moves(&board)
        });
        assert!(deadlocked);
    }
}
