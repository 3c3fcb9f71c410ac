//! Integration tests for nogo-rave
//!
//! End-to-end scenarios over the public API: board legality, history
//! replay, search, and the host protocol.

use nogo_rave::board::{Board, MoveError, Rules, Stone, all_points, point};
use nogo_rave::config::SearchConfig;
use nogo_rave::constants::N;
use nogo_rave::game::Game;
use nogo_rave::mcts::{auto_search, tree_search};
use nogo_rave::playout::EvaluatorKind;
use nogo_rave::protocol::{Engine, Format};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Place stones directly, without alternating colors.
fn setpos(rules: Rules, black: &[(usize, usize)], white: &[(usize, usize)]) -> Board {
    let mut board = Board::new(rules);
    for &(x, y) in black {
        assert!(board.place(point(x, y), Stone::Black), "black at ({x}, {y})");
    }
    for &(x, y) in white {
        assert!(board.place(point(x, y), Stone::White), "white at ({x}, {y})");
    }
    board
}

/// Four black stones around (4, 4).
const RING: [(usize, usize); 4] = [(4, 3), (3, 4), (5, 4), (4, 5)];

// =============================================================================
// Board scenarios
// =============================================================================

#[test]
fn test_ring_point_forbidden_for_white_only() {
    for rules in [Rules::Capture, Rules::NoCapture] {
        let board = setpos(rules, &RING, &[]);
        let eye = point(4, 4);
        assert!(board.is_forbidden(eye, Stone::White), "{rules:?}");
        assert!(!board.is_forbidden(eye, Stone::Black), "{rules:?}");
        assert!(!board.valid_places(Stone::White).contains(&eye));
        assert!(board.valid_places(Stone::Black).contains(&eye));
    }
}

#[test]
fn test_rejected_eye_placement_leaves_board_unchanged() {
    let mut board = setpos(Rules::Capture, &RING, &[(0, 0)]);
    let before = format!("{board:?}");
    let black_moves = board.valid_places(Stone::Black);
    let white_moves = board.valid_places(Stone::White);

    assert!(!board.place(point(4, 4), Stone::White));
    assert_eq!(board.play(point(4, 4), Stone::White), Err(MoveError::Forbidden(Stone::White)));

    assert_eq!(format!("{board:?}"), before);
    assert_eq!(board.valid_places(Stone::Black), black_moves);
    assert_eq!(board.valid_places(Stone::White), white_moves);
    for &(x, y) in &RING {
        assert_eq!(board.liberties(point(x, y)), 4);
    }
}

#[test]
fn test_capture_removes_stones_and_frees_points() {
    // White stone at (4, 4) surrounded on three sides.
    let mut board = setpos(Rules::Capture, &RING[..3], &[(4, 4)]);
    assert_eq!(board.liberties(point(4, 4)), 1);

    assert_eq!(board.play(point(4, 5), Stone::Black), Ok(1));
    assert_eq!(board.stone(point(4, 4)), Stone::Empty);
    assert_eq!(board.stone_count(Stone::White), 0);
    // The freed point is now an eye of the black ring.
    assert!(board.is_forbidden(point(4, 4), Stone::White));
    assert!(!board.is_forbidden(point(4, 4), Stone::Black));
    assert_eq!(board.liberties(point(4, 3)), 4);
}

#[test]
fn test_nogo_forbids_the_capturing_point() {
    let board = setpos(Rules::NoCapture, &RING[..3], &[(4, 4)]);
    assert!(board.is_forbidden(point(4, 5), Stone::Black));
    // White may extend out of atari.
    assert!(!board.is_forbidden(point(4, 5), Stone::White));
}

// =============================================================================
// Search scenarios
// =============================================================================

#[test]
fn test_empty_board_search_returns_legal_move() {
    let board = Board::default();
    let config = SearchConfig::deterministic(500, 1);
    let mut rng = fastrand::Rng::with_seed(1);
    for evaluator in [EvaluatorKind::RandomRollout, EvaluatorKind::Heuristic] {
        let report = tree_search(&board, Stone::Black, evaluator, None, &config, &mut rng).unwrap();
        let best = report.best_move.expect("empty board has moves");
        assert!(!board.is_forbidden(best, Stone::Black));
        assert!((0.0..=1.0).contains(&report.win_rate));
        assert_eq!(report.iterations, 500);
        assert_eq!(report.evaluator, evaluator);
    }
}

#[test]
fn test_search_avoids_forbidden_ring_point() {
    let board = setpos(Rules::NoCapture, &RING, &[(2, 2), (6, 6), (2, 6), (6, 2)]);
    let config = SearchConfig::deterministic(300, 5);
    let mut rng = fastrand::Rng::with_seed(5);
    let report = auto_search(&board, Stone::White, 1, &config, &mut rng).unwrap();
    let best = report.best_move.unwrap();
    assert_ne!(best, point(4, 4));
    assert!(!board.is_forbidden(best, Stone::White));
}

#[test]
fn test_search_is_reproducible_with_seed() {
    let game = Game::replay(&[(4, 4), (3, 3), (5, 5)], Rules::NoCapture).unwrap();
    let config = SearchConfig::deterministic(400, 99);
    let run = || {
        let mut rng = fastrand::Rng::with_seed(99);
        auto_search(&game.board, game.to_move, 20, &config, &mut rng).unwrap()
    };
    let a = run();
    let b = run();
    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.win_rate, b.win_rate);
    assert_eq!(a.evaluator, EvaluatorKind::RandomRollout);
}

#[test]
fn test_search_without_moves_reports_none() {
    // Black fills everything but two eyes; White has nowhere to play.
    let eyes = [point(0, 0), point(2, 0)];
    let mut board = Board::new(Rules::NoCapture);
    for pt in all_points().filter(|pt| !eyes.contains(pt)) {
        assert!(board.place(pt, Stone::Black));
    }
    let config = SearchConfig::deterministic(50, 3);
    let mut rng = fastrand::Rng::with_seed(3);
    let report = auto_search(&board, Stone::White, 40, &config, &mut rng).unwrap();
    assert_eq!(report.best_move, None);
}

// =============================================================================
// Replay and protocol
// =============================================================================

#[test]
fn test_replay_then_search_plays_for_side_to_move() {
    let game = Game::replay(&[(-1, -1), (4, 4), (3, 3)], Rules::Capture).unwrap();
    assert_eq!(game.to_move, Stone::Black);
    let config = SearchConfig::deterministic(200, 8);
    let mut rng = fastrand::Rng::with_seed(8);
    let report = auto_search(&game.board, game.to_move, 2, &config, &mut rng).unwrap();
    let best = report.best_move.unwrap();
    assert_eq!(game.board.stone(best), Stone::Empty);
    assert_eq!(report.evaluator, EvaluatorKind::Heuristic);
}

#[test]
fn test_engine_answers_json_request() {
    let mut engine = Engine::new(Rules::NoCapture, SearchConfig::deterministic(150, 4));
    let input = r#"{"requests":[{"x":4,"y":4},{"x":2,"y":2}],"responses":[{"x":6,"y":6}]}"#;
    let mut out = Vec::new();
    engine.run(Format::Json, input.as_bytes(), &mut out).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let x = value["response"]["x"].as_i64().unwrap();
    let y = value["response"]["y"].as_i64().unwrap();
    assert!((0..N as i64).contains(&x) && (0..N as i64).contains(&y));
    assert!(![(4, 4), (2, 2), (6, 6)].contains(&(x, y)));
    assert_eq!(value["debug"]["loop_times"], 150);
    let win_rate = value["debug"]["win_rate"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&win_rate));
}
