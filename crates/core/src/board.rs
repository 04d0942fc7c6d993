//! Board module - manages the tile grid
//!
//! The board is a `width x height` grid where each cell holds a tile or is empty.
//! Cells live in a flat row-major `Vec` (y * width + x).
//! Coordinates: (x, y) where x grows to the right and y grows downwards.
//!
//! Positions one step outside the grid form the virtual frame. The board
//! never stores anything there; [`Board::in_frame_bounds`] tells the path
//! search whether a position is inside the grid or its frame.

use thiserror::Error;

use crate::types::{Cell, PairKey, Position, Tile};

/// Configuration errors raised while building a board
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board of {width}x{height} has an odd number of cells; tiles come in pairs")]
    OddCellCount { width: usize, height: usize },
    #[error("board of {width}x{height} has no cells")]
    EmptyBoard { width: usize, height: usize },
    #[error("board of {width}x{height} is too large")]
    TooLarge { width: usize, height: usize },
    #[error("expected {expected} cells for the board, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("rows of a board fixture must all have the same length")]
    RaggedRows,
    #[error("board fixture uses more distinct symbols than pair keys allow")]
    TooManySymbols,
    #[error("theme has no categories")]
    EmptyTheme,
    #[error("theme category `{0}` has no items")]
    EmptyCategory(String),
    #[error("unknown theme category `{0}`")]
    UnknownCategory(String),
    #[error("theme is too large to index")]
    ThemeTooLarge,
}

/// The game board using flat row-major storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Check that a `width x height` board can hold whole pairs
    pub fn validate_dimensions(width: usize, height: usize) -> Result<(), BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyBoard { width, height });
        }
        // Frame positions run from -1 to the side length as i32.
        let cells = width
            .checked_mul(height)
            .filter(|_| width < i32::MAX as usize && height < i32::MAX as usize)
            .ok_or(BoardError::TooLarge { width, height })?;
        if cells % 2 != 0 {
            return Err(BoardError::OddCellCount { width, height });
        }
        Ok(())
    }

    /// Create a new empty board
    pub fn empty(width: usize, height: usize) -> Result<Self, BoardError> {
        Self::validate_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![None; width * height],
        })
    }

    /// Create from a flat row-major cell list
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, BoardError> {
        Self::validate_dimensions(width, height)?;
        if cells.len() != width * height {
            return Err(BoardError::CellCountMismatch {
                expected: width * height,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Wrap cells whose dimensions were already validated
    pub(crate) fn from_validated(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a board from a compact text layout.
    ///
    /// Every character is one cell: `.` is empty, any other character is a
    /// tile. Distinct characters get distinct pair keys in order of first
    /// appearance, so equal characters match. Tile ids are assigned in
    /// row-major order.
    ///
    /// ```
    /// use tile_link_core::Board;
    ///
    /// let board = Board::from_rows(&["AB", "BA"]).unwrap();
    /// assert_eq!(board.width(), 2);
    /// assert_eq!(board.occupied_count(), 4);
    /// ```
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if rows.iter().any(|r| r.chars().count() != width) {
            return Err(BoardError::RaggedRows);
        }

        let mut cells = Vec::with_capacity(rows.iter().map(|r| r.len()).sum());
        let mut symbols: Vec<char> = Vec::new();
        let mut next_id = 0u32;
        for row in rows {
            for ch in row.chars() {
                if ch == '.' {
                    cells.push(None);
                    continue;
                }
                let item = match symbols.iter().position(|&s| s == ch) {
                    Some(idx) => idx,
                    None => {
                        symbols.push(ch);
                        symbols.len() - 1
                    }
                };
                let item = u16::try_from(item).map_err(|_| BoardError::TooManySymbols)?;
                let symbol = ch.to_string();
                cells.push(Some(Tile::new(
                    next_id,
                    PairKey::new(0, item),
                    symbol.as_str(),
                    symbol.as_str(),
                )));
                next_id += 1;
            }
        }

        Self::from_cells(width, height, cells)
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        Some(pos.y as usize * self.width + pos.x as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Check if the position is inside the grid
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Check if the position is inside the grid or its one-cell frame
    pub fn in_frame_bounds(&self, pos: Position) -> bool {
        pos.x >= -1 && pos.y >= -1 && pos.x <= self.width as i32 && pos.y <= self.height as i32
    }

    /// Tile at position; None when empty or out of bounds
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).and_then(|idx| self.cells[idx].as_ref())
    }

    /// Check if position is inside the grid and holds a tile
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    /// Set cell at position.
    /// Returns false if out of bounds
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Remove and return the tile at position
    pub fn take(&mut self, pos: Position) -> Cell {
        let idx = self.index(pos)?;
        self.cells[idx].take()
    }

    /// Positions of occupied cells in row-major order
    pub fn occupied_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles().map(|(pos, _)| pos)
    }

    /// Occupied cells with their tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.as_ref()
                .map(|tile| (Position::new((idx % width) as i32, (idx / width) as i32), tile))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// True once every tile has been matched away
    pub fn is_cleared(&self) -> bool {
        self.cells.iter().all(|c| c.is_none())
    }

    /// Get a reference to the internal cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
