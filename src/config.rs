//! Search configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::constants::{
    EVAL_DEPTH, EVAL_WEIGHT_BOWL, EVAL_WEIGHT_LEGAL, MAX_ITERATIONS, RAVE_EQUIV, SWITCH_ROUND,
    TIME_LIMIT_MS, UCB_C,
};

/// Weights of the static evaluator used in place of rollouts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    /// Weight on (own legal moves - opponent legal moves).
    pub legal_moves: f64,
    /// Weight on (own bowls - opponent bowls).
    pub bowls: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            legal_moves: EVAL_WEIGHT_LEGAL,
            bowls: EVAL_WEIGHT_BOWL,
        }
    }
}

/// Parameters of a single move search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// UCB1 exploration constant.
    pub exploration: f64,

    /// RAVE blending constant. Larger values trust RAVE statistics for longer.
    pub rave_equiv: f64,

    /// Wall-clock budget in milliseconds (0 = no time limit).
    pub time_limit_ms: u64,

    /// Iteration cap (0 = unlimited).
    pub max_iterations: usize,

    /// Rounds before this one use the static evaluator instead of rollouts.
    pub switch_round: usize,

    /// Depth cap applied while the static evaluator is in use.
    pub eval_depth: u32,

    pub eval_weights: EvalWeights,

    /// Random seed. `None` seeds from the system.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: UCB_C,
            rave_equiv: RAVE_EQUIV,
            time_limit_ms: TIME_LIMIT_MS,
            max_iterations: MAX_ITERATIONS,
            switch_round: SWITCH_ROUND,
            eval_depth: EVAL_DEPTH,
            eval_weights: EvalWeights::default(),
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Time budget, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms))
    }

    /// Iteration cap, if any.
    pub fn iteration_cap(&self) -> Option<usize> {
        (self.max_iterations > 0).then_some(self.max_iterations)
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_switch_round(mut self, round: usize) -> Self {
        self.switch_round = round;
        self
    }

    /// A fixed-iteration, seeded config: reproducible regardless of machine speed.
    pub fn deterministic(iterations: usize, seed: u64) -> Self {
        Self::default()
            .with_time_limit_ms(0)
            .with_max_iterations(iterations)
            .with_seed(seed)
    }
}
