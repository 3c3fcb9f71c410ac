//! Host protocol front end.
//!
//! The host sends the whole game on every turn and expects one move back.
//! Two encodings are supported:
//!
//! - **JSON**: `{"requests": [{"x":..,"y":..}, ...], "responses": [...]}`.
//!   Requests are the opponent's moves (the first one is `-1 -1` when we
//!   open the game), responses are ours. The answer is
//!   `{"response": {"x":..,"y":..}, "debug": {...}}`.
//! - **Lines**: a turn count `n`, then `2n - 1` lines of `x y` alternating
//!   opponent and own moves. The answer is `x y` followed by a diagnostics line.
//!
//! `-1 -1` is answered when no legal move exists.
//!
//! ## Example
//!
//! ```ignore
//! use nogo_rave::board::Rules;
//! use nogo_rave::config::SearchConfig;
//! use nogo_rave::protocol::{Engine, Format};
//! let mut engine = Engine::new(Rules::NoCapture, SearchConfig::default());
//! engine.run(Format::Json, std::io::stdin().lock(), std::io::stdout())?;
//! ```

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::board::{Rules, coords};
use crate::config::SearchConfig;
use crate::game::{Game, ReplayError};
use crate::mcts::{SearchError, SearchReport, auto_search};
use crate::playout::EvaluatorKind;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON request: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed input: {0}")]
    Malformed(String),
    #[error("request contains no turn")]
    NoTurn,
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Input encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Lines,
}

/// A 0-based board coordinate as the host writes it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// "No move".
    pub const NONE: Coord = Coord { x: -1, y: -1 };
}

/// A JSON turn request.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub requests: Vec<Coord>,
    #[serde(default)]
    pub responses: Vec<Coord>,
}

impl Request {
    /// Interleave requests and responses into one history:
    /// `requests[0], responses[0], requests[1], ...`, ending with the last request.
    pub fn history(&self) -> Result<Vec<(i32, i32)>, ProtocolError> {
        let turns = self.requests.len();
        if turns == 0 {
            return Err(ProtocolError::NoTurn);
        }
        if self.responses.len() < turns - 1 {
            return Err(ProtocolError::Malformed(format!(
                "{turns} requests but only {} responses",
                self.responses.len()
            )));
        }
        let mut history = Vec::with_capacity(2 * turns - 1);
        for (i, req) in self.requests.iter().enumerate() {
            history.push((req.x, req.y));
            if i + 1 < turns {
                let resp = self.responses[i];
                history.push((resp.x, resp.y));
            }
        }
        Ok(history)
    }

    /// 1-based turn number.
    pub fn round(&self) -> usize {
        self.requests.len()
    }
}

/// Diagnostics sent back with each move.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub loop_times: usize,
    pub win_rate: f64,
    #[serde(rename = "type")]
    pub kind: EvaluatorKind,
}

impl From<&SearchReport> for DebugInfo {
    fn from(report: &SearchReport) -> Self {
        Self {
            loop_times: report.iterations,
            win_rate: report.win_rate,
            kind: report.evaluator,
        }
    }
}

impl DebugInfo {
    pub fn info(&self) -> String {
        format!(
            "loop_times: {}; win_rate: {:.6}; type: {}",
            self.loop_times, self.win_rate, self.kind
        )
    }
}

/// A JSON turn response.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub response: Coord,
    pub debug: DebugInfo,
}

/// Parse the line encoding into a history and the turn number.
pub fn parse_lines(input: &str) -> Result<(Vec<(i32, i32)>, usize), ProtocolError> {
    let mut tokens = input.split_whitespace();
    let turns: usize = tokens
        .next()
        .ok_or(ProtocolError::NoTurn)?
        .parse()
        .map_err(|e| ProtocolError::Malformed(format!("turn count: {e}")))?;
    if turns == 0 {
        return Err(ProtocolError::NoTurn);
    }

    let mut parse = |what: &str, i: usize| -> Result<i32, ProtocolError> {
        let tok = tokens
            .next()
            .ok_or_else(|| ProtocolError::Malformed(format!("move {i}: missing {what}")))?;
        tok.parse()
            .map_err(|e| ProtocolError::Malformed(format!("move {i}: {what} {tok:?}: {e}")))
    };
    let history = (0..2 * turns - 1)
        .map(|i| Ok((parse("x", i)?, parse("y", i)?)))
        .collect::<Result<Vec<_>, ProtocolError>>()?;
    Ok((history, turns))
}

/// Replays the host's history and searches for a reply.
pub struct Engine {
    rules: Rules,
    config: SearchConfig,
    rng: fastrand::Rng,
}

impl Engine {
    pub fn new(rules: Rules, config: SearchConfig) -> Self {
        let rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self { rules, config, rng }
    }

    /// Choose a move for the position reached by `history`.
    pub fn think(
        &mut self,
        history: &[(i32, i32)],
        round: usize,
    ) -> Result<(Coord, SearchReport), ProtocolError> {
        let game = Game::replay(history, self.rules)?;
        let report = auto_search(&game.board, game.to_move, round, &self.config, &mut self.rng)?;
        let coord = report.best_move.map_or(Coord::NONE, |pt| {
            let (x, y) = coords(pt);
            Coord { x: x as i32, y: y as i32 }
        });
        info!(round, x = coord.x, y = coord.y, "move chosen");
        Ok((coord, report))
    }

    /// Answer one JSON request.
    pub fn respond_json(&mut self, input: &str) -> Result<String, ProtocolError> {
        let request: Request = serde_json::from_str(input)?;
        let (coord, report) = self.think(&request.history()?, request.round())?;
        let response = Response {
            response: coord,
            debug: DebugInfo::from(&report),
        };
        Ok(serde_json::to_string(&response)?)
    }

    /// Answer one line-encoded request.
    pub fn respond_lines(&mut self, input: &str) -> Result<String, ProtocolError> {
        let (history, round) = parse_lines(input)?;
        let (coord, report) = self.think(&history, round)?;
        Ok(format!("{} {}\n{}", coord.x, coord.y, DebugInfo::from(&report).info()))
    }

    /// Read one whole request from `input` and write the answer to `output`.
    pub fn run<R: Read, W: Write>(
        &mut self,
        format: Format,
        mut input: R,
        mut output: W,
    ) -> Result<(), ProtocolError> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        let answer = match format {
            Format::Json => self.respond_json(&text)?,
            Format::Lines => self.respond_lines(&text)?,
        };
        writeln!(output, "{answer}")?;
        output.flush()?;
        Ok(())
    }
}
