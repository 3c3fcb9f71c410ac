//! Rebuilding a position from a move history.
//!
//! The host sends the whole game so far on every turn; nothing is kept
//! between moves. Placements alternate colors starting with Black. An entry
//! with `x == -1` is the host's "no move" marker: it is skipped without
//! touching the board and without changing the side to move.

use thiserror::Error;
use tracing::debug;

use crate::board::{Board, MoveError, Rules, Stone, checked_point};

/// The coordinate the host uses for "no move".
pub const NO_MOVE: (i32, i32) = (-1, -1);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("move {index}: ({x}, {y}) is off the board")]
    OffBoard { index: usize, x: i32, y: i32 },
    #[error("move {index}: {color} at ({x}, {y}) rejected: {err}")]
    Illegal {
        index: usize,
        x: i32,
        y: i32,
        color: Stone,
        #[source]
        err: MoveError,
    },
}

/// A board together with the side to move.
#[derive(Clone, Debug)]
pub struct Game {
    pub board: Board,
    pub to_move: Stone,
    /// Stones placed so far (markers excluded).
    pub placed: usize,
}

impl Game {
    pub fn new(rules: Rules) -> Self {
        Self {
            board: Board::new(rules),
            to_move: Stone::Black,
            placed: 0,
        }
    }

    /// Replay a full history from an empty board.
    pub fn replay(moves: &[(i32, i32)], rules: Rules) -> Result<Self, ReplayError> {
        let mut game = Self::new(rules);
        for (index, &(x, y)) in moves.iter().enumerate() {
            game.apply(index, x, y)?;
        }
        debug!(placed = game.placed, to_move = %game.to_move, "history replayed");
        Ok(game)
    }

    /// Apply one history entry. On error the game is left unchanged.
    pub fn apply(&mut self, index: usize, x: i32, y: i32) -> Result<(), ReplayError> {
        if x == NO_MOVE.0 {
            return Ok(());
        }
        let pt = checked_point(x, y).ok_or(ReplayError::OffBoard { index, x, y })?;
        self.board
            .play(pt, self.to_move)
            .map_err(|err| ReplayError::Illegal { index, x, y, color: self.to_move, err })?;
        self.to_move = self.to_move.opponent();
        self.placed += 1;
        Ok(())
    }
}
