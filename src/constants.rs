//! Constants for board dimensions and search parameters.
//!
//! The board uses a 1D array representation with a wall border so that
//! neighbor lookups never need bounds checks.
//!
//! # Board Size Configuration
//!
//! The board size is controlled by Cargo features:
//! - `board9x9` (default): 9x9 board
//! - `board13x13`: 13x13 board
//!
//! To compile for a specific board size:
//! ```sh
//! cargo build                           # 9x9 (default)
//! cargo build --no-default-features --features board13x13  # 13x13
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
#[cfg(feature = "board9x9")]
pub const N: usize = 9;

#[cfg(feature = "board13x13")]
pub const N: usize = 13;

// Compile-time check: exactly one board size feature must be enabled
#[cfg(all(feature = "board9x9", feature = "board13x13"))]
compile_error!("Cannot enable both 'board9x9' and 'board13x13' features at the same time");

#[cfg(not(any(feature = "board9x9", feature = "board13x13")))]
compile_error!("Must enable exactly one board size feature: 'board9x9' or 'board13x13'");

/// Row stride. Each row is one wall column followed by N playable points;
/// the wall column is shared between the right edge of one row and the left
/// edge of the next.
pub const W: usize = N + 1;

/// Total board array size: a wall row above and below the playable rows.
pub const BOARDSIZE: usize = (N + 2) * W + 1;

/// Number of playable points.
pub const AREA: usize = N * N;

/// Rollout length cap. Capture rules allow stones to be removed and the
/// points replayed, so random games are not bounded by the area alone.
pub const MAX_GAME_LEN: usize = AREA * 3;

/// Offsets to the 4 orthogonal neighbors. Order: North, West, East, South.
pub const DELTA: [isize; 4] = [-(W as isize), -1, 1, W as isize];

// =============================================================================
// Search Parameters
// =============================================================================

/// Exploration constant in the UCB1 term.
pub const UCB_C: f64 = 0.1;

/// RAVE blending constant: `alpha = n / (RAVE_EQUIV + n)`.
pub const RAVE_EQUIV: f64 = 500.0;

/// Wall-clock budget per move, in milliseconds.
pub const TIME_LIMIT_MS: u64 = 950;

/// Iteration cap per move.
pub const MAX_ITERATIONS: usize = 150_000;

/// Rounds before this one use the heuristic evaluator instead of rollouts.
pub const SWITCH_ROUND: usize = 15;

/// Tree depth cap used together with the heuristic evaluator.
pub const EVAL_DEPTH: u32 = 7;

/// Heuristic weight on the legal move difference.
pub const EVAL_WEIGHT_LEGAL: f64 = 0.02;

/// Heuristic weight on the bowl count difference.
pub const EVAL_WEIGHT_BOWL: f64 = 0.05;

/// Progress report period (number of iterations between reports).
pub const REPORT_PERIOD: usize = 10_000;
