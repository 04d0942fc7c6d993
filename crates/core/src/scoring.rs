//! Scoring module - points, penalties and level clocks

use crate::types::{
    LEVEL_TIME_STEP_SECS, MATCH_BASE_SCORE, MIN_LEVEL_TIME_SECS, SHUFFLE_PENALTY,
};

/// Points for one match: a flat base plus half the remaining seconds
pub fn match_score(time_remaining: u32) -> u32 {
    MATCH_BASE_SCORE + time_remaining / 2
}

/// Score after paying for a manual shuffle; never below zero
pub fn apply_shuffle_penalty(score: u32) -> u32 {
    score.saturating_sub(SHUFFLE_PENALTY)
}

/// Starting clock for `level` (1-based).
///
/// Each level after the first starts `LEVEL_TIME_STEP_SECS` shorter, down to
/// `MIN_LEVEL_TIME_SECS`. Level 0 is treated as level 1.
pub fn level_start_time(initial_time_secs: u32, level: u32) -> u32 {
    let cut = level
        .saturating_sub(1)
        .saturating_mul(LEVEL_TIME_STEP_SECS);
    initial_time_secs.saturating_sub(cut).max(MIN_LEVEL_TIME_SECS)
}
