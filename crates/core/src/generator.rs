//! Board generation
//!
//! Fills a board with `width * height / 2` random pairs. Each pair picks a
//! random category from the selection, then a random item in it, and emits
//! two tiles with the same pair key. The full tile list is shuffled and laid
//! out row by row, so a fresh board has no empty cells.

use std::sync::Arc;

use crate::board::{Board, BoardError};
use crate::rng::SimpleRng;
use crate::theme::Theme;
use crate::types::{PairKey, Tile};

/// Validated board recipe: dimensions, catalog and category selection
#[derive(Debug, Clone)]
pub struct BoardGenerator {
    width: usize,
    height: usize,
    theme: Arc<Theme>,
    categories: Vec<usize>,
}

impl BoardGenerator {
    /// Validate the recipe up front so later generation cannot fail.
    ///
    /// An empty `categories` list selects every category in the theme.
    pub fn new(
        width: usize,
        height: usize,
        theme: Arc<Theme>,
        categories: &[String],
    ) -> Result<Self, BoardError> {
        Board::validate_dimensions(width, height)?;
        let categories = theme.resolve(categories)?;
        Ok(Self {
            width,
            height,
            theme,
            categories,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pair_count(&self) -> usize {
        self.width * self.height / 2
    }

    /// Build a fully populated, shuffled board
    pub fn generate(&self, rng: &mut SimpleRng) -> Board {
        let mut pool: Vec<Tile> = Vec::with_capacity(self.pair_count() * 2);

        for pair in 0..self.pair_count() {
            let cat_idx = self.categories[rng.next_index(self.categories.len())];
            let category = &self.theme.categories[cat_idx];
            let item_idx = rng.next_index(category.items.len());
            let item = &category.items[item_idx];

            // resolve() bounded both indices by u16::MAX
            let key = PairKey::new(cat_idx as u16, item_idx as u16);
            let label: Arc<str> = Arc::from(item.label.as_str());
            let icon: Arc<str> = Arc::from(item.icon.as_str());
            let id = (pair * 2) as u32;

            pool.push(Tile::new(id, key, label.clone(), icon.clone()));
            pool.push(Tile::new(id + 1, key, label, icon));
        }

        rng.shuffle(&mut pool);

        let cells = pool.into_iter().map(Some).collect();
        Board::from_validated(self.width, self.height, cells)
    }
}

/// One-shot generation without keeping the recipe around
pub fn generate_board(
    width: usize,
    height: usize,
    theme: Arc<Theme>,
    categories: &[String],
    rng: &mut SimpleRng,
) -> Result<Board, BoardError> {
    Ok(BoardGenerator::new(width, height, theme, categories)?.generate(rng))
}
