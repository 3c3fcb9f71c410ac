//! Leaf evaluation: random playouts and a static evaluator.
//!
//! A playout alternates uniformly random legal placements until the side to
//! move has none; that side loses. Values are always from the perspective
//! of the side to move at the start, in `[0, 1]`.

use std::fmt;

use serde::Serialize;

use crate::board::{Board, Point, Stone, all_points};
use crate::config::EvalWeights;
use crate::constants::MAX_GAME_LEN;

/// How leaf positions are valued.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluatorKind {
    /// Uniformly random playout to the end of the game.
    RandomRollout,
    /// Static evaluation from legal move and bowl counts.
    #[serde(rename = "heuristic-evaluation")]
    Heuristic,
}

impl EvaluatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluatorKind::RandomRollout => "random-rollout",
            EvaluatorKind::Heuristic => "heuristic-evaluation",
        }
    }

    /// Value the position for `to_move`. Random playouts mutate `board`.
    pub fn evaluate(
        self,
        board: &mut Board,
        to_move: Stone,
        weights: &EvalWeights,
        rng: &mut fastrand::Rng,
    ) -> f64 {
        match self {
            EvaluatorKind::RandomRollout => rollout(board, to_move, weights, rng),
            EvaluatorKind::Heuristic => heuristic_value(board, to_move, weights),
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Play random legal moves until one side cannot move.
///
/// Returns 1.0 if the side that cannot move is the opponent of `to_move`,
/// 0.0 otherwise. Capture rules can recycle points indefinitely, so a game
/// still running after [`MAX_GAME_LEN`] placements is scored with
/// [`heuristic_value`] instead.
pub fn rollout(
    board: &mut Board,
    to_move: Stone,
    weights: &EvalWeights,
    rng: &mut fastrand::Rng,
) -> f64 {
    let mut color = to_move;
    for _ in 0..MAX_GAME_LEN {
        let Some(pt) = choose_random_place(board, color, rng) else {
            return if color == to_move { 0.0 } else { 1.0 };
        };
        board.place(pt, color);
        color = color.opponent();
    }
    heuristic_value(board, to_move, weights)
}

/// Pick a uniformly random legal point for `color`.
pub fn choose_random_place(board: &Board, color: Stone, rng: &mut fastrand::Rng) -> Option<Point> {
    let count = board.valid_place_count(color);
    if count == 0 {
        return None;
    }
    let k = rng.usize(..count);
    all_points().filter(|&pt| !board.is_forbidden(pt, color)).nth(k)
}

/// Static estimate of the win probability for `to_move`:
/// `0.5 + clamp(w1 * legal_diff + w2 * bowl_diff, -0.5, 0.5)`.
///
/// A side to move with no legal point has already lost and scores 0.0.
pub fn heuristic_value(board: &Board, to_move: Stone, weights: &EvalWeights) -> f64 {
    let own_moves = board.valid_place_count(to_move);
    if own_moves == 0 {
        return 0.0;
    }
    let opp = to_move.opponent();
    let legal_diff = own_moves as f64 - board.valid_place_count(opp) as f64;
    let bowl_diff = board.bowl_count(to_move) as f64 - board.bowl_count(opp) as f64;
    let score = weights.legal_moves * legal_diff + weights.bowls * bowl_diff;
    0.5 + score.clamp(-0.5, 0.5)
}
