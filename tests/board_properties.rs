//! Property tests: the incrementally maintained board state must agree with
//! a from-scratch recomputation after any sequence of legal placements.

use proptest::prelude::*;
use proptest::sample::Index;

use nogo_rave::board::{Board, Point, Rules, Stone, all_points, neighbors};

/// Points of the group at `pt` and its liberties, by flood fill.
fn flood(board: &Board, pt: Point) -> (Vec<Point>, Vec<Point>) {
    let color = board.stone(pt);
    let mut stones = vec![pt];
    let mut libs = Vec::new();
    let mut i = 0;
    while i < stones.len() {
        for n in neighbors(stones[i]) {
            let c = board.stone(n);
            if c == color && !stones.contains(&n) {
                stones.push(n);
            } else if c == Stone::Empty && !libs.contains(&n) {
                libs.push(n);
            }
        }
        i += 1;
    }
    (stones, libs)
}

/// Whether placing `color` at the empty point `pt` is illegal, decided by
/// counting liberties around a hypothetical stone.
fn forbidden_from_scratch(board: &Board, pt: Point, color: Stone) -> bool {
    let opp = color.opponent();
    let mut captures = false;
    let mut alive = false;
    for n in neighbors(pt) {
        match board.stone(n) {
            Stone::Empty => alive = true,
            c if c == opp => captures |= flood(board, n).1.len() == 1,
            c if c == color => alive |= flood(board, n).1.len() >= 2,
            _ => {}
        }
    }
    match board.rules() {
        Rules::Capture => !(alive || captures),
        Rules::NoCapture => captures || !alive,
    }
}

/// Play alternating moves, each chosen by `picks` among the legal points.
/// Returns the board and the number of stones placed.
fn play_out(rules: Rules, picks: &[Index]) -> (Board, usize) {
    let mut board = Board::new(rules);
    let mut color = Stone::Black;
    let mut placed = 0;
    for pick in picks {
        let moves = board.valid_places(color);
        if moves.is_empty() {
            break;
        }
        let pt = moves[pick.index(moves.len())];
        assert!(board.place(pt, color));
        placed += 1;
        color = color.opponent();
    }
    (board, placed)
}

fn check_invariants(board: &Board) -> Result<(), TestCaseError> {
    for pt in all_points() {
        match board.stone(pt) {
            Stone::Empty => {
                for color in [Stone::Black, Stone::White] {
                    prop_assert_eq!(
                        board.is_forbidden(pt, color),
                        forbidden_from_scratch(board, pt, color),
                        "legality of {} at {}\n{}",
                        color,
                        pt,
                        board
                    );
                }
            }
            _ => {
                prop_assert!(board.is_forbidden(pt, Stone::Black));
                prop_assert!(board.is_forbidden(pt, Stone::White));
                let (stones, libs) = flood(board, pt);
                prop_assert!(!libs.is_empty(), "group at {} has no liberties", pt);
                prop_assert_eq!(board.liberties(pt), libs.len());
                let mut members = board.group_stones(pt);
                let mut expected = stones;
                members.sort_unstable();
                expected.sort_unstable();
                prop_assert_eq!(members, expected);
            }
        }
    }
    for color in [Stone::Black, Stone::White] {
        prop_assert_eq!(board.valid_place_count(color), board.valid_places(color).len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn capture_board_matches_recount(picks in prop::collection::vec(any::<Index>(), 0..150)) {
        let (board, _) = play_out(Rules::Capture, &picks);
        check_invariants(&board)?;
    }

    #[test]
    fn nogo_board_matches_recount(picks in prop::collection::vec(any::<Index>(), 0..150)) {
        let (board, _) = play_out(Rules::NoCapture, &picks);
        check_invariants(&board)?;
    }

    #[test]
    fn nogo_never_removes_stones(picks in prop::collection::vec(any::<Index>(), 0..100)) {
        let (board, placed) = play_out(Rules::NoCapture, &picks);
        let stones = board.stone_count(Stone::Black) + board.stone_count(Stone::White);
        prop_assert_eq!(stones, placed);
    }
}
