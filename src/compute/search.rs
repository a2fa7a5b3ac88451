//! Informed graph search over the 8-connected grid.
//!
//! Dijkstra, A* and Greedy-Best-First share one expansion and relaxation
//! loop; they differ only in the priority used to order the open set.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::str::FromStr;
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::environment::{Environment, SearchSpace};
use super::geometry::{Action, Point};
use crate::schema::{GeneticConfigError, Solution};

/// Planning failures reported to callers.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("{solver} cannot solve a problem with {pickups} pickup points")]
    WrongProblemType { solver: &'static str, pickups: usize },
    #[error("No path from {start} to {goal}")]
    Unreachable { start: Point, goal: Point },
    #[error("Chromosome length mismatch: {left} vs {right}")]
    MismatchedChromosomeLength { left: usize, right: usize },
    #[error("Leg {from} -> {to} unsolvable after {attempts} attempts")]
    LegUnsolvable {
        from: Point,
        to: Point,
        attempts: usize,
    },
    #[error("Invalid genetic configuration: {0}")]
    InvalidConfig(#[from] GeneticConfigError),
}

/// Anything that turns an environment into a route.
pub trait Solver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, env: &Environment) -> Result<Solution, PlanError>;
}

/// Index of a node in a [`SearchTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A search-tree vertex. Identity is the position alone; the back-pointer
/// and the action are path history.
#[derive(Debug, Clone)]
pub struct Node {
    pub position: Point,
    pub parent: Option<NodeId>,
    pub action: Option<Action>,
}

impl Node {
    pub fn root(position: Point) -> Self {
        Self {
            position,
            parent: None,
            action: None,
        }
    }

    pub fn child(position: Point, parent: NodeId, action: Action) -> Self {
        Self {
            position,
            parent: Some(parent),
            action: Some(action),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.position.hash(state);
    }
}

/// Arena of nodes; parents are referenced by index.
#[derive(Debug, Default)]
pub struct SearchTree {
    nodes: Vec<Node>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes from the root to `id`, following parent links.
    pub fn path_to(&self, id: NodeId) -> Vec<&Node> {
        let mut path = Vec::new();
        let mut current = self.get(id);
        while let Some(node) = current {
            path.push(node);
            current = node.parent.and_then(|p| self.get(p));
        }
        path.reverse();
        path
    }
}

impl Index<NodeId> for SearchTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

/// Open-set ordering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Accumulated cost. Optimal.
    Dijkstra,
    /// Accumulated cost plus Euclidean distance to goal. Optimal, since every
    /// move costs at least its Euclidean length.
    AStar,
    /// Euclidean distance to goal only. Not optimal.
    GreedyBestFirst,
}

impl Strategy {
    #[inline]
    pub fn priority(self, cost: f64, position: Point, goal: Point) -> f64 {
        match self {
            Strategy::Dijkstra => cost,
            Strategy::AStar => cost + position.distance(&goal),
            Strategy::GreedyBestFirst => position.distance(&goal),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Dijkstra => "Dijkstra",
            Strategy::AStar => "A*",
            Strategy::GreedyBestFirst => "Greedy-Best-First",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(Strategy::Dijkstra),
            "astar" | "a*" | "a_star" => Ok(Strategy::AStar),
            "gbfs" | "greedy" | "greedy_best_first" => Ok(Strategy::GreedyBestFirst),
            other => Err(format!("unknown search strategy '{other}'")),
        }
    }
}

/// Open-set entry. Lower priority pops first; equal priorities pop in
/// insertion order, which follows the fixed action order.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    priority: f64,
    seq: u64,
    id: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for a min-heap
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Path found by one search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub path: Vec<Point>,
    pub actions: Vec<Option<Action>>,
    pub cost: f64,
    pub expanded: usize,
}

/// Run one search from the space's start to its goal.
///
/// Returns `None` when the open set empties without reaching the goal.
pub fn search(space: &SearchSpace<'_>, strategy: Strategy) -> Option<SearchOutcome> {
    let start = space.start();
    let goal = space.goal();

    let mut tree = SearchTree::new();
    let mut open = BinaryHeap::new();
    let mut tentative: HashMap<Point, (f64, NodeId)> = HashMap::new();
    let mut closed: HashSet<Point> = HashSet::new();
    let mut seq = 0u64;
    let mut expanded = 0usize;

    let root = tree.push(Node::root(start));
    tentative.insert(start, (0.0, root));
    open.push(OpenEntry {
        priority: strategy.priority(0.0, start, goal),
        seq,
        id: root,
    });

    while let Some(entry) = open.pop() {
        let position = tree[entry.id].position;
        if closed.contains(&position) {
            continue;
        }
        // stale entry superseded by a cheaper one
        let cost = match tentative.get(&position) {
            Some(&(cost, id)) if id == entry.id => cost,
            _ => continue,
        };

        closed.insert(position);
        expanded += 1;

        if position == goal {
            let nodes = tree.path_to(entry.id);
            return Some(SearchOutcome {
                path: nodes.iter().map(|n| n.position).collect(),
                actions: nodes.iter().map(|n| n.action).collect(),
                cost,
                expanded,
            });
        }

        let children = space.neighbors(entry.id, &tree[entry.id]);
        for child in children {
            if closed.contains(&child.position) {
                continue;
            }
            let step = child.action.map_or(0.0, Action::cost);
            let candidate = cost + step;
            let improves = tentative
                .get(&child.position)
                .is_none_or(|&(known, _)| candidate < known);
            if !improves {
                continue;
            }

            let next = child.position;
            let id = tree.push(child);
            tentative.insert(next, (candidate, id));
            seq += 1;
            open.push(OpenEntry {
                priority: strategy.priority(candidate, next, goal),
                seq,
                id,
            });
        }
    }

    debug!(
        "{} exhausted the open set after {} expansions ({} -> {})",
        strategy, expanded, start, goal
    );
    None
}

/// Point-to-point solver for one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSolver {
    strategy: Strategy,
}

impl SearchSolver {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn dijkstra() -> Self {
        Self::new(Strategy::Dijkstra)
    }

    pub fn a_star() -> Self {
        Self::new(Strategy::AStar)
    }

    pub fn greedy_best_first() -> Self {
        Self::new(Strategy::GreedyBestFirst)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

impl Solver for SearchSolver {
    fn name(&self) -> &'static str {
        self.strategy.name()
    }

    fn solve(&self, env: &Environment) -> Result<Solution, PlanError> {
        if env.has_pickups() {
            return Err(PlanError::WrongProblemType {
                solver: self.name(),
                pickups: env.pickup_points().len(),
            });
        }

        let session = env.begin_planning();
        let started = Instant::now();
        let space = session.space(env.start(), env.goal());
        let outcome = search(&space, self.strategy);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        session.end();

        let outcome = outcome.ok_or(PlanError::Unreachable {
            start: env.start(),
            goal: env.goal(),
        })?;

        info!(
            "{} reached {} with cost {:.3} ({} expansions, {:.2} ms)",
            self.strategy, env.goal(), outcome.cost, outcome.expanded, elapsed_ms
        );

        Ok(Solution {
            path: outcome.path,
            actions: outcome.actions,
            cost: outcome.cost,
            elapsed_ms,
            expanded: outcome.expanded,
        })
    }
}
