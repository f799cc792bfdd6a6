//! The maze as a deterministic Markov Decision Process.
//!
//! Every open cell is a state and the four [`Direction`]s are the actions. Moving into a wall or
//! off the grid leaves the state unchanged. The exit is terminal: its value stays anchored at its
//! reward and is never swept.

use std::{collections::HashSet, time::Duration};

use thiserror::Error;

mod policy_iteration;
mod value_iteration;

pub use policy_iteration::policy_iteration;
pub use value_iteration::value_iteration;

use crate::maze::{Coord, Direction, Grid, Maze};

/// The chosen action per cell. Walls hold `None`.
pub type Policy = Grid<Option<Direction>>;
/// Value estimate per cell. Walls stay at zero.
pub type ValueFunction = Grid<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RewardModel {
    /// `0` at the exit, `-1` everywhere else.
    #[default]
    TerminalOnly,
    /// `+1` at the exit, `-step_cost` everywhere else.
    Shaped { step_cost: f64 },
}

impl RewardModel {
    pub const DEFAULT_STEP_COST: f64 = 0.04;

    pub fn default_shaped() -> Self {
        RewardModel::Shaped {
            step_cost: Self::DEFAULT_STEP_COST,
        }
    }

    pub fn reward(self, is_exit: bool) -> f64 {
        match (self, is_exit) {
            (RewardModel::TerminalOnly, true) => 0.0,
            (RewardModel::TerminalOnly, false) => -1.0,
            (RewardModel::Shaped { .. }, true) => 1.0,
            (RewardModel::Shaped { step_cost }, false) => -step_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MdpConfig {
    /// Per-step discount, within `(0, 1)`.
    pub discount_factor: f64,
    /// A sweep whose largest value change is below this has converged.
    pub theta: f64,
    pub reward_model: RewardModel,
    /// Cap on sweeps per evaluation, on improvement rounds, and on value-iteration sweeps.
    pub max_iterations: usize,
}

impl Default for MdpConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.99,
            theta: 0.001,
            reward_model: RewardModel::default(),
            max_iterations: 10_000,
        }
    }
}

impl MdpConfig {
    pub fn validate(&self) -> Result<(), MdpError> {
        let reason = if !(self.discount_factor > 0.0 && self.discount_factor < 1.0) {
            format!(
                "discount factor must be within (0, 1), got {}",
                self.discount_factor
            )
        } else if !(self.theta > 0.0) {
            format!("theta must be positive, got {}", self.theta)
        } else if self.max_iterations == 0 {
            "the iteration cap must be at least 1".to_string()
        } else {
            match self.reward_model {
                RewardModel::Shaped { step_cost } if !step_cost.is_finite() => {
                    format!("step cost must be finite, got {}", step_cost)
                }
                _ => return Ok(()),
            }
        };
        Err(MdpError::InvalidParameters { reason })
    }
}

/// The loop that ran out of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PolicyEvaluation,
    PolicyImprovement,
    ValueIteration,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::PolicyEvaluation => write!(f, "policy evaluation"),
            Phase::PolicyImprovement => write!(f, "policy improvement"),
            Phase::ValueIteration => write!(f, "value iteration"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MdpError {
    #[error("Invalid MDP parameters: {reason}")]
    InvalidParameters { reason: String },
    #[error("Cell {coord:?} is not an open cell")]
    NotOpen { coord: Coord },
    #[error("{phase} did not converge within {iterations} iterations")]
    NonConvergence { phase: Phase, iterations: usize },
    #[error("Policy loops back on itself at {last_state:?} after {steps} steps")]
    PolicyDivergence { last_state: Coord, steps: usize },
}

/// Where a walk along a policy stopped short of the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    pub last_state: Coord,
    pub steps: usize,
}

/// A converged MDP solve.
#[derive(Debug, Clone, PartialEq)]
pub struct MdpSolution {
    pub policy: Policy,
    pub values: ValueFunction,
    /// Entry to exit, following `policy`. Empty when the policy never reaches the exit.
    pub path: Vec<Coord>,
    /// Set when `path` is empty: where following `policy` from the entry went wrong.
    pub divergence: Option<Divergence>,
    /// Improvement rounds for policy iteration, sweeps for value iteration.
    pub iterations: usize,
    /// Total value sweeps across all phases.
    pub sweeps: usize,
    pub elapsed: Duration,
}

/// Where `action` takes `state`: the neighbor if it is open, otherwise `state` itself.
pub fn transition(maze: &Maze, state: Coord, action: Direction) -> Coord {
    maze.neighbor(state, action)
        .filter(|&c| maze.is_open(c))
        .unwrap_or(state)
}

/// The maze seen as an MDP towards one goal, with the parameters of a single solve.
pub(crate) struct MazeMdp<'a> {
    maze: &'a Maze,
    goal: Coord,
    config: &'a MdpConfig,
    /// Every open cell except the goal, row-major. This is the sweep order.
    states: Vec<Coord>,
}

impl<'a> MazeMdp<'a> {
    pub(crate) fn new(maze: &'a Maze, config: &'a MdpConfig) -> Result<Self, MdpError> {
        config.validate()?;
        let goal = maze.exit();
        for coord in [maze.entry(), goal] {
            if !maze.is_open(coord) {
                return Err(MdpError::NotOpen { coord });
            }
        }
        let states = maze.open_cells().filter(|&c| c != goal).collect();
        Ok(Self {
            maze,
            goal,
            config,
            states,
        })
    }

    pub(crate) fn maze(&self) -> &Maze {
        self.maze
    }

    pub(crate) fn states(&self) -> &[Coord] {
        &self.states
    }

    pub(crate) fn theta(&self) -> f64 {
        self.config.theta
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.config.max_iterations
    }

    pub(crate) fn reward(&self, state: Coord) -> f64 {
        self.config.reward_model.reward(state == self.goal)
    }

    /// Zero everywhere except the goal, which holds its terminal reward.
    pub(crate) fn initial_values(&self) -> ValueFunction {
        let mut values = Grid::new(self.maze.rows(), self.maze.cols(), 0.0);
        values[self.goal] = self.reward(self.goal);
        values
    }

    pub(crate) fn q_value(&self, values: &ValueFunction, state: Coord, action: Direction) -> f64 {
        let next = transition(self.maze, state, action);
        self.reward(state) + self.config.discount_factor * values[next]
    }

    /// The best action and its value. Ties go to the lowest action index.
    pub(crate) fn greedy(&self, values: &ValueFunction, state: Coord) -> (Direction, f64) {
        let mut best = (Direction::ALL[0], self.q_value(values, state, Direction::ALL[0]));
        for action in Direction::ALL.into_iter().skip(1) {
            let q = self.q_value(values, state, action);
            if q > best.1 {
                best = (action, q);
            }
        }
        best
    }

    /// `Up` in every open cell.
    pub(crate) fn initial_policy(&self) -> Policy {
        let mut policy = Grid::new(self.maze.rows(), self.maze.cols(), None);
        for state in self.maze.open_cells() {
            policy[state] = Some(Direction::Up);
        }
        policy
    }

    /// The greedy action for every open cell, the goal included.
    pub(crate) fn greedy_policy(&self, values: &ValueFunction) -> Policy {
        let mut policy = Grid::new(self.maze.rows(), self.maze.cols(), None);
        for state in self.maze.open_cells() {
            policy[state] = Some(self.greedy(values, state).0);
        }
        policy
    }

    /// Follows `policy` from the entry. A divergence is part of the result rather than an error,
    /// so the caller keeps the policy and values it converged to.
    pub(crate) fn route(
        &self,
        policy: &Policy,
    ) -> Result<(Vec<Coord>, Option<Divergence>), MdpError> {
        match extract_path(self.maze, policy, self.maze.entry(), self.goal) {
            Ok(path) => Ok((path, None)),
            Err(MdpError::PolicyDivergence { last_state, steps }) => {
                tracing::info!(
                    "[mdp] policy diverges at {:?} after {} steps",
                    last_state,
                    steps
                );
                Ok((Vec::new(), Some(Divergence { last_state, steps })))
            }
            Err(e) => Err(e),
        }
    }
}

/// Follows `policy` from `start` until `goal`.
///
/// A step that leaves the state unchanged, or that comes back to a state already on the path,
/// means the policy never reaches `goal`; that is reported as [`MdpError::PolicyDivergence`]
/// naming the last state reached. The walk is a pure function of its inputs.
pub fn extract_path(
    maze: &Maze,
    policy: &Policy,
    start: Coord,
    goal: Coord,
) -> Result<Vec<Coord>, MdpError> {
    if !maze.is_open(start) {
        return Err(MdpError::NotOpen { coord: start });
    }

    let mut path = vec![start];
    let mut seen = HashSet::from([start]);
    let mut state = start;
    while state != goal {
        let diverged = MdpError::PolicyDivergence {
            last_state: state,
            steps: path.len() - 1,
        };
        let Some(action) = policy.get(state).copied().flatten() else {
            return Err(diverged);
        };
        let next = transition(maze, state, action);
        if next == state || !seen.insert(next) {
            return Err(diverged);
        }
        path.push(next);
        state = next;
    }
    Ok(path)
}

/// Row-major action codes (`0..=3`, see [`Direction`]) with `None` for walls.
pub fn export_policy(policy: &Policy) -> Vec<Vec<Option<u8>>> {
    policy
        .row_slices()
        .map(|row| {
            row.iter()
                .map(|action| action.map(Direction::code))
                .collect()
        })
        .collect()
}
