//! Integration tests for the game state machine

use std::collections::HashMap;
use std::sync::Arc;

use tile_link::core::{
    generate_board, Board, Effect, GameConfig, GameState, SelectOutcome, SimpleRng, Theme,
};
use tile_link::types::{
    GameStatus, PairKey, PlayerCommand, Position, DEFAULT_INITIAL_TIME_SECS,
    FALLBACK_CLOSING_MESSAGE, TIME_UP_MESSAGE,
};

fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

fn game(rows: &[&str]) -> GameState {
    let board = Board::from_rows(rows).unwrap();
    let mut state = GameState::with_board(&GameConfig::default(), 99, board).unwrap();
    state.start();
    state.take_effects();
    state
}

#[test]
fn test_game_lifecycle() {
    let mut state = GameState::new(&GameConfig::default(), 12345).unwrap();
    assert!(!state.started());

    state.start();
    assert!(state.started());
    assert_eq!(state.status(), GameStatus::Playing);
    assert_eq!(state.board().occupied_count(), 48);
    assert_eq!(state.time_remaining(), DEFAULT_INITIAL_TIME_SECS);
}

#[test]
fn test_two_by_two_victory() {
    let mut state = game(&["AB", "AB"]);

    assert!(state.apply_command(PlayerCommand::Select { x: 0, y: 0 }));
    assert!(state.apply_command(PlayerCommand::Select { x: 0, y: 1 }));
    assert_eq!(state.score(), 160);
    assert_eq!(state.status(), GameStatus::Playing);

    state.select_tile(p(1, 0));
    let outcome = state.select_tile(p(1, 1));
    assert!(matches!(outcome, SelectOutcome::Matched { points: 160, .. }));
    assert_eq!(state.status(), GameStatus::Victory);
    assert_eq!(state.score(), 320);
    assert!(state.board().is_cleared());

    let effects = state.take_effects();
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::RequestClosingMessage { score: 320, .. })));

    // Nothing but a restart leaves the terminal state.
    assert!(!state.tick());
    assert_eq!(state.select_tile(p(0, 0)), SelectOutcome::Ignored);
    assert!(state.request_hint().is_none());
    assert!(!state.shuffle());
    assert_eq!(state.status(), GameStatus::Victory);

    state.resolve_closing_message(state.episode_id(), Some(String::new()));
    assert_eq!(state.message(), FALLBACK_CLOSING_MESSAGE);
}

#[test]
fn test_clock_runs_out() {
    let mut state = GameState::new(&GameConfig::default(), 7).unwrap();
    state.start();
    state.take_effects();

    for _ in 0..119 {
        assert!(state.tick());
    }
    assert_eq!(state.status(), GameStatus::Playing);
    assert_eq!(state.time_remaining(), 1);

    assert!(state.tick());
    assert_eq!(state.status(), GameStatus::GameOver);
    assert_eq!(state.time_remaining(), 0);
    assert_eq!(state.score(), 0);
    assert_eq!(state.message(), TIME_UP_MESSAGE);
    assert_eq!(
        state.take_effects(),
        vec![Effect::StopTicking {
            episode: state.episode_id()
        }]
    );

    assert!(!state.tick());
    assert_eq!(state.time_remaining(), 0);
}

#[test]
fn test_match_empties_exactly_two_cells() {
    let mut state = game(&["AB.C", "DB.C", "DA.."]);
    let before = state.board().clone();

    state.select_tile(p(1, 0));
    let outcome = state.select_tile(p(1, 1));
    assert!(matches!(outcome, SelectOutcome::Matched { reshuffled: false, .. }));

    let after = state.board();
    assert_eq!(after.occupied_count(), before.occupied_count() - 2);
    for y in 0..3 {
        for x in 0..4 {
            let q = p(x, y);
            if q == p(1, 0) || q == p(1, 1) {
                assert!(after.get(q).is_none(), "{q}");
            } else {
                assert_eq!(after.get(q), before.get(q), "{q}");
            }
        }
    }
}

#[test]
fn test_score_uses_remaining_time() {
    let mut state = game(&["AB", "AB"]);
    for _ in 0..75 {
        state.tick();
    }
    assert_eq!(state.time_remaining(), 45);

    state.select_tile(p(0, 0));
    match state.select_tile(p(0, 1)) {
        SelectOutcome::Matched { points, .. } => assert_eq!(points, 122),
        other => panic!("expected a match, got {other:?}"),
    }
    assert_eq!(state.score(), 122);
}

#[test]
fn test_shuffle_never_goes_negative() {
    let mut state = game(&["AB", "AB"]);
    assert!(state.apply_command(PlayerCommand::Shuffle));
    assert_eq!(state.score(), 0);

    state.restart(1, 120);
    state.shuffle();
    assert_eq!(state.score(), 70);
    state.shuffle();
    assert_eq!(state.score(), 20);
    state.shuffle();
    assert_eq!(state.score(), 0);
}

#[test]
fn test_restart_command_defaults() {
    let mut state = game(&["AB", "AB"]);
    state.select_tile(p(0, 0));
    state.select_tile(p(0, 1));

    assert!(state.apply_command(PlayerCommand::Restart {
        level: None,
        carry_score: None
    }));
    assert_eq!(state.level(), 1);
    assert_eq!(state.score(), 0);
    assert_eq!(state.board().occupied_count(), 4);
    assert!(state.selected().is_none());

    state.apply_command(PlayerCommand::Restart {
        level: Some(0),
        carry_score: Some(40),
    });
    assert_eq!(state.level(), 1);
    assert_eq!(state.score(), 40);
}

#[test]
fn test_level_clock_floor() {
    let mut state = game(&["AB", "AB"]);
    state.restart(5, 0);
    assert_eq!(state.time_remaining(), 80);
    state.restart(20, 0);
    assert_eq!(state.time_remaining(), 30);
}

#[test]
fn test_generated_tiles_pair_up_by_id() {
    // Keys repeat once the board holds more pairs than the theme has items;
    // the pair itself is tiles 2n and 2n+1.
    let theme = Arc::new(Theme::default());
    for seed in 1..50u32 {
        let mut rng = SimpleRng::new(seed);
        let board = generate_board(6, 8, theme.clone(), &[], &mut rng).unwrap();
        assert_eq!(board.occupied_count(), 48);

        let mut by_id: HashMap<u32, PairKey> = HashMap::new();
        for (_, tile) in board.tiles() {
            assert!(by_id.insert(tile.id, tile.key).is_none(), "seed {seed}");
        }
        assert_eq!(by_id.len(), 48);
        for n in 0..24u32 {
            assert_eq!(by_id[&(2 * n)], by_id[&(2 * n + 1)], "seed {seed} pair {n}");
        }

        let mut counts: HashMap<PairKey, usize> = HashMap::new();
        for key in by_id.values() {
            *counts.entry(*key).or_default() += 1;
        }
        assert!(counts.values().all(|c| c % 2 == 0), "seed {seed}");
    }
}

#[test]
fn test_same_seed_replays_the_same_game() {
    let config = GameConfig::default();
    let mut a = GameState::new(&config, 4242).unwrap();
    let mut b = GameState::new(&config, 4242).unwrap();
    assert_eq!(a.board(), b.board());

    a.shuffle();
    b.shuffle();
    assert_eq!(a.board(), b.board());

    a.restart(2, 0);
    b.restart(2, 0);
    assert_eq!(a.snapshot(), b.snapshot());
}
