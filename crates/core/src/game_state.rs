//! Game state module - the authoritative state machine
//!
//! Ties together the board, the random source, the path search and the
//! scoring rules. Every mutation goes through a method on [`GameState`].
//!
//! Time-based behaviour is not run here. Instead the state machine queues
//! [`Effect`]s (start/stop the clock, run something later, fetch a closing
//! message) which the host drains with [`GameState::take_effects`]. Delayed
//! work comes back as a [`Scheduled`] command tagged with the episode and the
//! path or hint it was meant for; [`GameState::apply_scheduled`] drops it when
//! that target is gone, so a late callback can never touch a newer game.

use std::sync::Arc;

use tracing::{debug, info};

use crate::board::{Board, BoardError};
use crate::connect::{connect, Path};
use crate::deadlock::{find_move, has_moves};
use crate::generator::BoardGenerator;
use crate::reshuffle::reshuffle;
use crate::rng::SimpleRng;
use crate::scoring::{apply_shuffle_penalty, level_start_time, match_score};
use crate::snapshot::GameSnapshot;
use crate::theme::Theme;
use crate::types::*;

/// Static game settings
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Clock at level 1, in seconds
    pub initial_time_secs: u32,
    /// Period of one clock tick
    pub tick_ms: u32,
    /// Category names to draw from; empty means all
    pub categories: Vec<String>,
    pub theme: Arc<Theme>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            initial_time_secs: DEFAULT_INITIAL_TIME_SECS,
            tick_ms: TICK_MS,
            categories: Vec::new(),
            theme: Arc::new(Theme::default()),
        }
    }
}

/// What a tile click did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Game over, empty cell or out of range; nothing changed
    Ignored,
    /// First tile of a pair picked
    Selected,
    /// The selected tile was clicked again
    Deselected,
    /// No link to the previous selection; the clicked tile is selected instead
    Reselected,
    /// Both tiles removed
    Matched {
        path: Path,
        points: u32,
        /// The board had no moves left and was reshuffled
        reshuffled: bool,
    },
}

/// Delayed command the host feeds back after the requested delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheduled {
    /// One clock period elapsed
    Tick { episode: u32 },
    /// Match highlight expired
    ClearPath { episode: u32, path_id: u32 },
    /// Draw the path of a pending hint
    ShowHint { episode: u32, hint_id: u32 },
    /// Remove a hint's selection and path
    EndHint { episode: u32, hint_id: u32 },
}

impl Scheduled {
    pub fn episode(&self) -> u32 {
        match *self {
            Scheduled::Tick { episode }
            | Scheduled::ClearPath { episode, .. }
            | Scheduled::ShowHint { episode, .. }
            | Scheduled::EndHint { episode, .. } => episode,
        }
    }
}

/// Side effect requested from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace any running clock with one feeding `Scheduled::Tick` every `period_ms`
    StartTicking { episode: u32, period_ms: u32 },
    /// Stop the clock
    StopTicking { episode: u32 },
    /// Feed `event` back after `delay_ms`
    Schedule { delay_ms: u32, event: Scheduled },
    /// Fetch a closing message and pass it to `resolve_closing_message`
    RequestClosingMessage { episode: u32, score: u32, level: u32 },
}

#[derive(Debug, Clone)]
struct ActiveHint {
    id: u32,
    path: Path,
    shown: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    generator: BoardGenerator,
    rng: SimpleRng,
    initial_time_secs: u32,
    tick_ms: u32,
    board: Board,
    selected: Option<Position>,
    path: Option<Path>,
    /// Bumped every time a path is put on screen.
    path_id: u32,
    hint: Option<ActiveHint>,
    next_hint_id: u32,
    score: u32,
    time_remaining: u32,
    level: u32,
    status: GameStatus,
    message: String,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    started: bool,
    /// Automatic reshuffles after a match left no moves (this episode).
    reshuffles: u32,
    effects: Vec<Effect>,
}

impl GameState {
    /// Create a new game with a generated board
    pub fn new(config: &GameConfig, seed: u32) -> Result<Self, BoardError> {
        let generator = BoardGenerator::new(
            config.width,
            config.height,
            config.theme.clone(),
            &config.categories,
        )?;
        let mut rng = SimpleRng::new(seed);
        let board = generator.generate(&mut rng);
        Ok(Self::assemble(generator, rng, board, config))
    }

    /// Create a game around a prepared board (fixtures, puzzles, replays).
    ///
    /// The board's dimensions override `config.width`/`config.height`;
    /// restarts generate boards of that size.
    pub fn with_board(config: &GameConfig, seed: u32, board: Board) -> Result<Self, BoardError> {
        let generator = BoardGenerator::new(
            board.width(),
            board.height(),
            config.theme.clone(),
            &config.categories,
        )?;
        Ok(Self::assemble(generator, SimpleRng::new(seed), board, config))
    }

    fn assemble(
        generator: BoardGenerator,
        rng: SimpleRng,
        board: Board,
        config: &GameConfig,
    ) -> Self {
        Self {
            generator,
            rng,
            initial_time_secs: config.initial_time_secs,
            tick_ms: config.tick_ms.max(1),
            board,
            selected: None,
            path: None,
            path_id: 0,
            hint: None,
            next_hint_id: 0,
            score: 0,
            time_remaining: level_start_time(config.initial_time_secs, 1),
            level: 1,
            status: GameStatus::Playing,
            message: String::new(),
            episode_id: 0,
            started: false,
            reshuffles: 0,
            effects: Vec::new(),
        }
    }

    /// Start the clock for the first game
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.effects.push(Effect::StartTicking {
            episode: self.episode_id,
            period_ms: self.tick_ms,
        });
        info!(
            episode = self.episode_id,
            level = self.level,
            time = self.time_remaining,
            "game started"
        );
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn reshuffles(&self) -> u32 {
        self.reshuffles
    }

    /// Take all effects queued since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Apply a player command; returns whether anything changed
    pub fn apply_command(&mut self, command: PlayerCommand) -> bool {
        match command {
            PlayerCommand::Select { x, y } => {
                self.select_tile(Position::new(x, y)) != SelectOutcome::Ignored
            }
            PlayerCommand::Hint => self.request_hint().is_some(),
            PlayerCommand::Shuffle => self.shuffle(),
            PlayerCommand::Restart { level, carry_score } => {
                self.restart(level.unwrap_or(1), carry_score.unwrap_or(0));
                true
            }
            PlayerCommand::NextLevel => self.next_level(),
        }
    }

    /// Handle a click on the tile at `pos`
    pub fn select_tile(&mut self, pos: Position) -> SelectOutcome {
        if self.status.is_terminal() || !self.board.is_occupied(pos) {
            return SelectOutcome::Ignored;
        }

        // Any click takes over from a pending hint.
        self.cancel_hint();

        let Some(current) = self.selected else {
            self.selected = Some(pos);
            return SelectOutcome::Selected;
        };

        if current == pos {
            self.selected = None;
            return SelectOutcome::Deselected;
        }

        match connect(&self.board, current, pos) {
            Some(path) => self.complete_match(current, pos, path),
            None => {
                self.selected = Some(pos);
                SelectOutcome::Reselected
            }
        }
    }

    fn complete_match(&mut self, from: Position, to: Position, path: Path) -> SelectOutcome {
        self.board.take(from);
        self.board.take(to);
        self.selected = None;

        let points = match_score(self.time_remaining);
        self.score = self.score.saturating_add(points);
        debug!(
            episode = self.episode_id,
            %from,
            %to,
            turns = path.turns(),
            points,
            "tiles matched"
        );

        self.path_id = self.path_id.wrapping_add(1);
        self.path = Some(path.clone());
        self.effects.push(Effect::Schedule {
            delay_ms: PATH_CLEAR_MS,
            event: Scheduled::ClearPath {
                episode: self.episode_id,
                path_id: self.path_id,
            },
        });

        let mut reshuffled = false;
        if self.board.is_cleared() {
            self.status = GameStatus::Victory;
            self.message.clear();
            self.effects.push(Effect::StopTicking {
                episode: self.episode_id,
            });
            self.effects.push(Effect::RequestClosingMessage {
                episode: self.episode_id,
                score: self.score,
                level: self.level,
            });
            info!(
                episode = self.episode_id,
                score = self.score,
                level = self.level,
                "board cleared"
            );
        } else if !has_moves(&self.board) {
            reshuffle(&mut self.board, &mut self.rng);
            self.reshuffles += 1;
            reshuffled = true;
            debug!(
                episode = self.episode_id,
                remaining = self.board.occupied_count(),
                "no moves left, board reshuffled"
            );
        }

        SelectOutcome::Matched {
            path,
            points,
            reshuffled,
        }
    }

    /// One clock period: lose a second, end the game at zero.
    /// Returns false when the clock is not running.
    pub fn tick(&mut self) -> bool {
        if !self.started || self.status.is_terminal() {
            return false;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.cancel_hint();
            self.selected = None;
            self.status = GameStatus::GameOver;
            self.message = TIME_UP_MESSAGE.to_string();
            self.effects.push(Effect::StopTicking {
                episode: self.episode_id,
            });
            info!(
                episode = self.episode_id,
                score = self.score,
                "time ran out"
            );
        }
        true
    }

    /// Point out the first connectible pair.
    ///
    /// Selects the pair's first tile now; the path is drawn after
    /// `HINT_SHOW_MS` and both are cleared after `HINT_CLEAR_MS`. Score and
    /// board are untouched. Returns None (and changes nothing) when the game
    /// is over or no pair connects.
    pub fn request_hint(&mut self) -> Option<Path> {
        if self.status.is_terminal() {
            return None;
        }
        let mv = find_move(&self.board)?;

        self.cancel_hint();
        self.next_hint_id = self.next_hint_id.wrapping_add(1);
        let hint_id = self.next_hint_id;
        self.selected = Some(mv.from);
        self.hint = Some(ActiveHint {
            id: hint_id,
            path: mv.path.clone(),
            shown: false,
        });

        let episode = self.episode_id;
        self.effects.push(Effect::Schedule {
            delay_ms: HINT_SHOW_MS,
            event: Scheduled::ShowHint { episode, hint_id },
        });
        self.effects.push(Effect::Schedule {
            delay_ms: HINT_CLEAR_MS,
            event: Scheduled::EndHint { episode, hint_id },
        });
        debug!(episode, hint_id, from = %mv.from, to = %mv.to, "hint");

        Some(mv.path)
    }

    fn cancel_hint(&mut self) {
        if let Some(hint) = self.hint.take() {
            if hint.shown {
                self.path = None;
            }
        }
    }

    /// Reshuffle on demand for a score penalty
    pub fn shuffle(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.hint = None;
        self.selected = None;
        self.path = None;
        reshuffle(&mut self.board, &mut self.rng);
        self.score = apply_shuffle_penalty(self.score);
        debug!(episode = self.episode_id, score = self.score, "manual shuffle");
        true
    }

    /// Start a fresh board at `level` with `carry_score` points.
    ///
    /// Bumps the episode id, which invalidates every pending scheduled
    /// command of the previous game, and asks the host to restart the clock.
    pub fn restart(&mut self, level: u32, carry_score: u32) {
        let level = level.max(1);
        self.board = self.generator.generate(&mut self.rng);
        self.level = level;
        self.time_remaining = level_start_time(self.initial_time_secs, level);
        self.score = carry_score;
        self.selected = None;
        self.path = None;
        self.hint = None;
        self.message.clear();
        self.status = GameStatus::Playing;
        self.reshuffles = 0;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.started = true;
        self.effects.push(Effect::StartTicking {
            episode: self.episode_id,
            period_ms: self.tick_ms,
        });
        info!(
            episode = self.episode_id,
            level,
            score = carry_score,
            time = self.time_remaining,
            "game restarted"
        );
    }

    /// After a victory, move on to the next level keeping the score
    pub fn next_level(&mut self) -> bool {
        if self.status != GameStatus::Victory {
            return false;
        }
        self.restart(self.level.saturating_add(1), self.score);
        true
    }

    /// Run a delayed command; stale commands are ignored (returns false)
    pub fn apply_scheduled(&mut self, event: Scheduled) -> bool {
        if event.episode() != self.episode_id {
            return false;
        }

        match event {
            Scheduled::Tick { .. } => self.tick(),
            Scheduled::ClearPath { path_id, .. } => {
                if self.path_id != path_id || self.path.is_none() {
                    return false;
                }
                self.path = None;
                true
            }
            Scheduled::ShowHint { hint_id, .. } => {
                let Some(hint) = self.hint.as_mut().filter(|h| h.id == hint_id) else {
                    return false;
                };
                hint.shown = true;
                self.path_id = self.path_id.wrapping_add(1);
                self.path = Some(hint.path.clone());
                true
            }
            Scheduled::EndHint { hint_id, .. } => {
                if self.hint.as_ref().map(|h| h.id) != Some(hint_id) {
                    return false;
                }
                self.cancel_hint();
                self.selected = None;
                true
            }
        }
    }

    /// Store the closing message fetched for `episode`.
    ///
    /// `None` or blank text falls back to `FALLBACK_CLOSING_MESSAGE`. Ignored
    /// unless that episode is still showing its victory.
    pub fn resolve_closing_message(&mut self, episode: u32, text: Option<String>) -> bool {
        if episode != self.episode_id || self.status != GameStatus::Victory {
            return false;
        }
        self.message = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| FALLBACK_CLOSING_MESSAGE.to_string());
        true
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.width = self.board.width();
        out.height = self.board.height();
        out.cells.clear();
        out.cells.extend_from_slice(self.board.cells());
        out.selected = self.selected;
        out.path.clear();
        if let Some(path) = &self.path {
            out.path.extend_from_slice(path.points());
        }
        out.score = self.score;
        out.time_remaining = self.time_remaining;
        out.level = self.level;
        out.status = self.status;
        out.message.clear();
        out.message.push_str(&self.message);
        out.episode_id = self.episode_id;
        out.remaining_tiles = self.board.occupied_count();
        out.reshuffles = self.reshuffles;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
