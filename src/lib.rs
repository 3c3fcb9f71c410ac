//! NoGo-RAVE: a Monte Carlo Tree Search engine for 9x9 capture and NoGo play.
//!
//! The engine replays the game history onto an incremental board and runs
//! UCB1-RAVE tree search under a time or iteration budget.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and search defaults
//! - [`board`] - Incremental board state (groups, liberties, legality)
//! - [`game`] - Replaying a move history
//! - [`playout`] - Random playouts and the static evaluator
//! - [`config`] - Search configuration
//! - [`mcts`] - Monte Carlo Tree Search with RAVE
//! - [`protocol`] - Host protocol front end (JSON and line encodings)
//!
//! ## Example
//!
//! ```
//! use nogo_rave::board::{Rules, Stone, point};
//! use nogo_rave::config::SearchConfig;
//! use nogo_rave::game::Game;
//! use nogo_rave::mcts::auto_search;
//!
//! // Black opens in the center, White to move
//! let game = Game::replay(&[(4, 4)], Rules::NoCapture).unwrap();
//! assert_eq!(game.board.stone(point(4, 4)), Stone::Black);
//!
//! // Search a fixed number of iterations with a reproducible seed
//! let config = SearchConfig::deterministic(100, 42);
//! let mut rng = fastrand::Rng::with_seed(42);
//! let report = auto_search(&game.board, game.to_move, 1, &config, &mut rng).unwrap();
//! assert!(report.best_move.is_some());
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod game;
pub mod mcts;
pub mod playout;
pub mod protocol;
