//! Session configuration from environment variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TILE_LINK_WIDTH` / `TILE_LINK_HEIGHT` | 6 / 8 |
//! | `TILE_LINK_INITIAL_TIME` | 120 seconds |
//! | `TILE_LINK_CATEGORIES` | all, comma-separated names |
//! | `TILE_LINK_THEME_PATH` | built-in catalog |
//! | `TILE_LINK_SEED` | derived from the clock |
//! | `TILE_LINK_TICK_MS` | 1000 |
//! | `TILE_LINK_MESSAGE_TIMEOUT_MS` | 5000 |
//!
//! Unparsable numbers fall back to their default. A theme file that cannot
//! be read or parsed is an error.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use tile_link_core::{GameConfig, Theme};

use crate::types::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_INITIAL_TIME_SECS, TICK_MS};

pub const DEFAULT_MESSAGE_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub game: GameConfig,
    pub seed: u32,
    /// Upper bound on waiting for the closing message
    pub message_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            seed: 1,
            message_timeout: Duration::from_millis(DEFAULT_MESSAGE_TIMEOUT_MS),
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let theme = match lookup("TILE_LINK_THEME_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
        {
            Some(path) => load_theme(Path::new(&path))?,
            None => Theme::default(),
        };

        let categories: Vec<String> = lookup("TILE_LINK_CATEGORIES")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let game = GameConfig {
            width: parsed(&lookup, "TILE_LINK_WIDTH").unwrap_or(DEFAULT_GRID_WIDTH),
            height: parsed(&lookup, "TILE_LINK_HEIGHT").unwrap_or(DEFAULT_GRID_HEIGHT),
            initial_time_secs: parsed(&lookup, "TILE_LINK_INITIAL_TIME")
                .unwrap_or(DEFAULT_INITIAL_TIME_SECS),
            tick_ms: parsed(&lookup, "TILE_LINK_TICK_MS").unwrap_or(TICK_MS),
            categories,
            theme: Arc::new(theme),
        };

        Ok(Self {
            game,
            seed: parsed(&lookup, "TILE_LINK_SEED").unwrap_or_else(clock_seed),
            message_timeout: Duration::from_millis(
                parsed(&lookup, "TILE_LINK_MESSAGE_TIMEOUT_MS").unwrap_or(DEFAULT_MESSAGE_TIMEOUT_MS),
            ),
        })
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

/// Read a theme catalog from a JSON file
pub fn load_theme(path: &Path) -> Result<Theme> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading theme file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing theme file {}", path.display()))
}

fn clock_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}
