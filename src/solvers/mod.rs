use std::{collections::HashSet, str::FromStr, time::Duration};

pub mod astar;
pub mod heuristic;
pub mod mdp;
pub mod traversal;

pub use astar::{AStar, OpenSetUpdate, solve_astar};
pub use heuristic::Heuristic;
pub use mdp::{MdpConfig, MdpError, MdpSolution, RewardModel, policy_iteration, value_iteration};
pub use traversal::{Order, solve_bfs, solve_dfs};

use crate::maze::{Coord, Maze};

/// What a graph or heuristic search hands back.
///
/// An empty `path` means the goal was unreachable; `explored` then holds every cell the search
/// managed to reach.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub path: Vec<Coord>,
    /// Visited cells for DFS/BFS, the closed set for A*.
    pub explored: HashSet<Coord>,
    /// Number of neighbor tests performed.
    pub expansions: usize,
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Walks parent links back from `goal` and returns the path in start-to-goal order.
pub(crate) fn walk_back<K: Copy>(
    goal: K,
    mut parent_of: impl FnMut(K) -> Option<K>,
) -> Vec<K> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(parent) = parent_of(current) {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}

#[derive(Debug, Clone, PartialEq)]
pub enum Solver {
    Dfs,
    Bfs,
    AStar(Heuristic),
    PolicyIteration(MdpConfig),
    ValueIteration(MdpConfig),
}

impl Solver {
    /// One of each solver, with default parameters.
    pub fn all() -> [Solver; 5] {
        [
            Solver::Dfs,
            Solver::Bfs,
            Solver::AStar(Heuristic::Manhattan),
            Solver::PolicyIteration(MdpConfig::default()),
            Solver::ValueIteration(MdpConfig::default()),
        ]
    }
}

impl std::fmt::Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Solver::Dfs => write!(f, "Depth-First Search (DFS)"),
            Solver::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Solver::AStar(heuristic) => write!(f, "A* Search ({})", heuristic),
            Solver::PolicyIteration(_) => write!(f, "MDP Policy Iteration"),
            Solver::ValueIteration(_) => write!(f, "MDP Value Iteration"),
        }
    }
}

impl FromStr for Solver {
    type Err = String;

    /// Accepts the short names `dfs`, `bfs`, `astar`, `mdppit` and `mdpvit`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dfs" => Ok(Solver::Dfs),
            "bfs" => Ok(Solver::Bfs),
            "astar" | "a*" => Ok(Solver::AStar(Heuristic::Manhattan)),
            "mdppit" | "pit" => Ok(Solver::PolicyIteration(MdpConfig::default())),
            "mdpvit" | "vit" => Ok(Solver::ValueIteration(MdpConfig::default())),
            other => Err(format!("Unknown solver '{}'", other)),
        }
    }
}

/// Common view of any solver's result, for harnesses comparing them side by side.
#[derive(Debug, Clone)]
pub struct Solution {
    pub path: Vec<Coord>,
    pub explored: HashSet<Coord>,
    /// Neighbor tests for searches, value sweeps for MDP solvers.
    pub loops: usize,
    pub elapsed: Duration,
    /// Only set by the MDP solvers.
    pub mdp: Option<MdpSolution>,
}

impl From<SearchOutcome> for Solution {
    fn from(outcome: SearchOutcome) -> Self {
        Solution {
            path: outcome.path,
            explored: outcome.explored,
            loops: outcome.expansions,
            elapsed: outcome.elapsed,
            mdp: None,
        }
    }
}

impl Solution {
    fn from_mdp(maze: &Maze, solution: MdpSolution) -> Self {
        Solution {
            path: solution.path.clone(),
            // Every state takes part in each sweep
            explored: maze.open_cells().collect(),
            loops: solution.sweeps,
            elapsed: solution.elapsed,
            mdp: Some(solution),
        }
    }
}

/// Runs `solver` from the maze entry to its exit.
///
/// Searches never fail: an unreachable exit shows up as an empty path. Only the MDP solvers can
/// return an error.
pub fn solve_maze(maze: &Maze, solver: &Solver) -> Result<Solution, MdpError> {
    let solution = match solver {
        Solver::Dfs => solve_dfs(maze).into(),
        Solver::Bfs => solve_bfs(maze).into(),
        Solver::AStar(heuristic) => solve_astar(maze, *heuristic).into(),
        Solver::PolicyIteration(config) => {
            Solution::from_mdp(maze, policy_iteration(maze, config)?)
        }
        Solver::ValueIteration(config) => Solution::from_mdp(maze, value_iteration(maze, config)?),
    };
    tracing::info!(
        "[solve] {}: path length {}, explored {}, loops {}, took {:?}",
        solver,
        solution.path.len(),
        solution.explored.len(),
        solution.loops,
        solution.elapsed
    );
    Ok(solution)
}
