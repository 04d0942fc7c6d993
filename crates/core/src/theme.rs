//! Theme catalog - the categories and items tiles are drawn from
//!
//! The catalog is opaque content: the engine only picks from it at random
//! and copies the label and icon onto tiles. Hosts can ship their own
//! catalog as JSON:
//!
//! ```json
//! {"categories": [{"name": "fruit", "items": [{"label": "Apple", "icon": "🍎"}]}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::board::BoardError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeItem {
    pub label: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub items: Vec<ThemeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub categories: Vec<Category>,
}

fn category(name: &str, items: &[(&str, &str)]) -> Category {
    Category {
        name: name.to_string(),
        items: items
            .iter()
            .map(|&(label, icon)| ThemeItem {
                label: label.to_string(),
                icon: icon.to_string(),
            })
            .collect(),
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            categories: vec![
                category(
                    "food",
                    &[
                        ("Apple", "🍎"),
                        ("Banana", "🍌"),
                        ("Watermelon", "🍉"),
                        ("Strawberry", "🍓"),
                    ],
                ),
                category(
                    "animal",
                    &[("Cat", "🐱"), ("Dog", "🐶"), ("Rabbit", "🐰"), ("Bear", "🐻")],
                ),
                category(
                    "transport",
                    &[("Car", "🚗"), ("Plane", "✈️"), ("Ship", "🚢"), ("Bicycle", "🚲")],
                ),
                category(
                    "sports",
                    &[
                        ("Football", "⚽"),
                        ("Basketball", "🏀"),
                        ("Tennis", "🎾"),
                        ("Volleyball", "🏐"),
                    ],
                ),
            ],
        }
    }
}

impl Theme {
    pub fn category(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    /// Resolve category names to catalog indices.
    ///
    /// An empty selection means every category. Names match
    /// case-insensitively. Every resolved category must have at least one item.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<usize>, BoardError> {
        if self.categories.is_empty() {
            return Err(BoardError::EmptyTheme);
        }
        if self.categories.len() > u16::MAX as usize
            || self.categories.iter().any(|c| c.items.len() > u16::MAX as usize)
        {
            return Err(BoardError::ThemeTooLarge);
        }

        let selected: Vec<usize> = if names.is_empty() {
            (0..self.categories.len()).collect()
        } else {
            names
                .iter()
                .map(|name| {
                    self.categories
                        .iter()
                        .position(|c| c.name.eq_ignore_ascii_case(name.trim()))
                        .ok_or_else(|| BoardError::UnknownCategory(name.clone()))
                })
                .collect::<Result<_, _>>()?
        };

        for &idx in &selected {
            let cat = &self.categories[idx];
            if cat.items.is_empty() {
                return Err(BoardError::EmptyCategory(cat.name.clone()));
            }
        }

        Ok(selected)
    }
}
