//! Monte Carlo Tree Search (MCTS) with RAVE.
//!
//! Each iteration clones the root board, descends the tree with UCB1-RAVE
//! (placing the chosen moves on the clone), expands one new node, values the
//! resulting position with a playout or the static evaluator, and walks the
//! result back up to the root.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]; dropping the
//! tree frees one `Vec` no matter how deep it grew.

use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::board::{Board, Point, Stone, str_coord};
use crate::config::SearchConfig;
use crate::constants::REPORT_PERIOD;
use crate::playout::EvaluatorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search needs a time limit or an iteration cap")]
    Unbounded,
    #[error("cannot search for {0}")]
    NotAPlayer(Stone),
}

/// Index of a node in the tree arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the search tree.
///
/// `v` and `vrave` are accumulated from the point of view of `color`, the
/// player who made `mv`, so a parent always prefers its highest-valued child.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Move that led here; `None` at the root.
    pub mv: Option<Point>,
    /// Color that made `mv`. At the root, the opponent of the side to move.
    pub color: Stone,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Legal moves for the side to move here, shuffled once.
    untried: Vec<Point>,
    next_untried: usize,
    /// Visits
    pub n: u32,
    /// Cumulative value
    pub v: f64,
    /// RAVE visits
    pub m: u32,
    /// RAVE cumulative value
    pub vrave: f64,
    pub fully_expanded: bool,
    /// The side to move here has no legal point.
    pub terminal: bool,
}

impl TreeNode {
    /// Create a node for `board`, which must already include `mv`.
    fn new(
        board: &Board,
        mv: Option<Point>,
        color: Stone,
        parent: Option<NodeId>,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut untried = board.valid_places(color.opponent());
        rng.shuffle(&mut untried);
        Self {
            mv,
            color,
            parent,
            children: Vec::new(),
            terminal: untried.is_empty(),
            untried,
            next_untried: 0,
            n: 0,
            v: 0.0,
            m: 0,
            vrave: 0.0,
            fully_expanded: false,
        }
    }

    /// Moves not yet expanded, in expansion order.
    pub fn untried(&self) -> &[Point] {
        &self.untried[self.next_untried..]
    }

    /// RAVE-blended value estimate: `alpha * v/n + (1 - alpha) * vrave/m`
    /// with `alpha = n / (rave_equiv + n)`.
    pub fn blended_value(&self, rave_equiv: f64) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let n = self.n as f64;
        let alpha = n / (rave_equiv + n);
        let mean = self.v / n;
        let rave = if self.m > 0 { self.vrave / self.m as f64 } else { mean };
        alpha * mean + (1.0 - alpha) * rave
    }
}

/// Search tree with arena-based node storage. The root is always node 0.
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
}

impl SearchTree {
    /// Create a tree whose root is `board` with `to_move` to play.
    pub fn new(board: &Board, to_move: Stone, rng: &mut fastrand::Rng) -> Self {
        let root = TreeNode::new(board, None, to_move.opponent(), None, rng);
        Self { nodes: vec![root] }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Expand the next untried move of `id`, playing it on `board`.
    ///
    /// Returns `None` if the node is terminal or already fully expanded.
    pub fn expand(
        &mut self,
        id: NodeId,
        board: &mut Board,
        rng: &mut fastrand::Rng,
    ) -> Option<NodeId> {
        let node = self.get_mut(id);
        if node.terminal || node.fully_expanded {
            return None;
        }
        let mv = node.untried[node.next_untried];
        node.next_untried += 1;
        if node.next_untried == node.untried.len() {
            node.fully_expanded = true;
        }
        let color = node.color.opponent();

        let placed = board.place(mv, color);
        debug_assert!(placed, "untried move {} rejected", str_coord(mv));

        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode::new(board, Some(mv), color, Some(id), rng));
        self.get_mut(id).children.push(child_id);
        Some(child_id)
    }

    /// Child with the highest UCB1-RAVE score. Ties are broken uniformly at random.
    pub fn best_child(
        &self,
        id: NodeId,
        config: &SearchConfig,
        rng: &mut fastrand::Rng,
    ) -> Option<NodeId> {
        self.select(id, Some(config.exploration), config.rave_equiv, rng)
            .map(|(child, _)| child)
    }

    /// Child with the highest blended value, without the exploration term.
    /// Returns the child together with its value.
    pub fn best_child_without_ucb(
        &self,
        id: NodeId,
        config: &SearchConfig,
        rng: &mut fastrand::Rng,
    ) -> Option<(NodeId, f64)> {
        self.select(id, None, config.rave_equiv, rng)
    }

    fn select(
        &self,
        id: NodeId,
        exploration: Option<f64>,
        rave_equiv: f64,
        rng: &mut fastrand::Rng,
    ) -> Option<(NodeId, f64)> {
        let log_n = (self.get(id).n.max(1) as f64).ln();
        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        let mut ties = 0;

        for &child_id in &self.get(id).children {
            let child = self.get(child_id);
            let score = match exploration {
                Some(_) if child.n == 0 => f64::INFINITY,
                Some(c) => child.blended_value(rave_equiv) + c * (log_n / child.n as f64).sqrt(),
                None => child.blended_value(rave_equiv),
            };
            if best.is_none() || score > best_score {
                best = Some(child_id);
                best_score = score;
                ties = 1;
            } else if score == best_score {
                // Reservoir sampling over equal scores.
                ties += 1;
                if rng.usize(..ties) == 0 {
                    best = Some(child_id);
                }
            }
        }

        best.map(|child| (child, best_score))
    }

    /// Descend from the root, applying the chosen moves to `board`, and
    /// return the node to evaluate.
    ///
    /// Every node on the path has its visit count incremented. Descent stops
    /// at a terminal node, right after expanding a new child, or once
    /// `depth_cap` moves have been applied.
    pub fn tree_policy(
        &mut self,
        board: &mut Board,
        depth_cap: Option<u32>,
        config: &SearchConfig,
        rng: &mut fastrand::Rng,
    ) -> NodeId {
        let mut cur = self.root();
        let mut depth = 0;

        loop {
            let node = self.get_mut(cur);
            node.n += 1;
            if node.terminal || depth_cap.is_some_and(|cap| depth >= cap) {
                return cur;
            }

            if !node.fully_expanded {
                return match self.expand(cur, board, rng) {
                    Some(child) => {
                        self.get_mut(child).n += 1;
                        child
                    }
                    None => cur,
                };
            }

            let Some(child) = self.best_child(cur, config, rng) else {
                return cur;
            };
            let node = self.get(child);
            if let Some(mv) = node.mv {
                let placed = board.place(mv, node.color);
                debug_assert!(placed, "tree move {} rejected", str_coord(mv));
            }
            cur = child;
            depth += 1;
        }
    }

    /// Propagate a result from `leaf` to the root.
    ///
    /// `value` is from the point of view of `to_move`, the side to move at
    /// the leaf. Each node on the path also credits its move to the RAVE
    /// statistics of the same move wherever an ancestor offers it.
    pub fn backup(&mut self, leaf: NodeId, value: f64, to_move: Stone) {
        let mut cur = Some(leaf);
        while let Some(id) = cur {
            let node = self.get_mut(id);
            let v = if node.color == to_move { value } else { 1.0 - value };
            node.v += v;
            let (mv, color, parent) = (node.mv, node.color, node.parent);
            if let Some(mv) = mv {
                self.credit_rave(parent, mv, color, v);
            }
            cur = parent;
        }
    }

    fn credit_rave(&mut self, mut ancestor: Option<NodeId>, mv: Point, color: Stone, value: f64) {
        while let Some(id) = ancestor {
            let node = self.get(id);
            ancestor = node.parent;
            if node.color == color {
                continue;
            }
            let sibling = node
                .children
                .iter()
                .copied()
                .find(|&c| self.get(c).mv == Some(mv));
            if let Some(sibling) = sibling {
                let sibling = self.get_mut(sibling);
                sibling.m += 1;
                sibling.vrave += value;
            }
        }
    }
}

/// Outcome of a move search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// Recommended move; `None` when the side to move has no legal point.
    pub best_move: Option<Point>,
    pub iterations: usize,
    /// Blended value of the recommended move for the side to move, in `[0, 1]`.
    pub win_rate: f64,
    pub evaluator: EvaluatorKind,
    pub tree_nodes: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Run MCTS from `board` with `to_move` to play.
///
/// The loop runs until the configured time limit or iteration cap is hit,
/// checked before each iteration; at least one iteration always runs.
pub fn tree_search(
    board: &Board,
    to_move: Stone,
    evaluator: EvaluatorKind,
    depth_cap: Option<u32>,
    config: &SearchConfig,
    rng: &mut fastrand::Rng,
) -> Result<SearchReport, SearchError> {
    if !matches!(to_move, Stone::Black | Stone::White) {
        return Err(SearchError::NotAPlayer(to_move));
    }
    let time_limit = config.time_limit();
    let iteration_cap = config.iteration_cap();
    if time_limit.is_none() && iteration_cap.is_none() {
        return Err(SearchError::Unbounded);
    }

    let start = Instant::now();
    let mut tree = SearchTree::new(board, to_move, rng);
    let root = tree.root();

    if tree.get(root).terminal {
        warn!(%to_move, "no legal move available");
        return Ok(SearchReport {
            best_move: None,
            iterations: 0,
            win_rate: 0.0,
            evaluator,
            tree_nodes: tree.len(),
            elapsed: start.elapsed(),
        });
    }

    let mut iterations = 0;
    loop {
        if iterations > 0 {
            if time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                break;
            }
            if iteration_cap.is_some_and(|cap| iterations >= cap) {
                break;
            }
        }

        let mut current = board.clone();
        let leaf = tree.tree_policy(&mut current, depth_cap, config, rng);
        let leaf_to_move = tree.get(leaf).color.opponent();
        let value = evaluator.evaluate(&mut current, leaf_to_move, &config.eval_weights, rng);
        tree.backup(leaf, value, leaf_to_move);
        iterations += 1;

        trace!(leaf = leaf.0, value, "simulation complete");
        if iterations % REPORT_PERIOD == 0 {
            debug!(iterations, nodes = tree.len(), elapsed_ms = start.elapsed().as_millis() as u64, "search progress");
        }
    }

    let (best_move, win_rate) = match tree.best_child_without_ucb(root, config, rng) {
        Some((child, value)) => (tree.get(child).mv, value),
        None => (None, 0.0),
    };

    let report = SearchReport {
        best_move,
        iterations,
        win_rate,
        evaluator,
        tree_nodes: tree.len(),
        elapsed: start.elapsed(),
    };
    info!(
        best = %report.best_move.map(str_coord).unwrap_or_else(|| "none".into()),
        iterations = report.iterations,
        win_rate = report.win_rate,
        evaluator = %report.evaluator,
        nodes = report.tree_nodes,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "search finished"
    );
    Ok(report)
}

/// Search with the evaluator chosen by game phase: the static evaluator
/// (with its depth cap) before `config.switch_round`, random playouts after.
pub fn auto_search(
    board: &Board,
    to_move: Stone,
    round: usize,
    config: &SearchConfig,
    rng: &mut fastrand::Rng,
) -> Result<SearchReport, SearchError> {
    if round < config.switch_round {
        tree_search(board, to_move, EvaluatorKind::Heuristic, Some(config.eval_depth), config, rng)
    } else {
        tree_search(board, to_move, EvaluatorKind::RandomRollout, None, config, rng)
    }
}
