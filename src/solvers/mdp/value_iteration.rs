use std::time::Instant;

use super::{MazeMdp, MdpConfig, MdpError, MdpSolution, Phase};
use crate::maze::Maze;

/// Solves the maze by sweeping `V(s) <- max_a [R(s) + gamma * V(s')]` in place until the largest
/// change in a sweep drops below `theta`, then reads the greedy policy off the values.
pub fn value_iteration(maze: &Maze, config: &MdpConfig) -> Result<MdpSolution, MdpError> {
    let started = Instant::now();
    let mdp = MazeMdp::new(maze, config)?;
    let mut values = mdp.initial_values();

    let mut sweeps = 0;
    loop {
        if sweeps == mdp.max_iterations() {
            tracing::info!("[vit] no convergence after {} sweeps", sweeps);
            return Err(MdpError::NonConvergence {
                phase: Phase::ValueIteration,
                iterations: sweeps,
            });
        }
        sweeps += 1;

        let mut delta: f64 = 0.0;
        for &state in mdp.states() {
            let (_, best) = mdp.greedy(&values, state);
            delta = delta.max((best - values[state]).abs());
            values[state] = best;
        }
        if delta < mdp.theta() {
            break;
        }
    }

    let policy = mdp.greedy_policy(&values);
    let (path, divergence) = mdp.route(&policy)?;
    tracing::debug!(
        "[vit] converged after {} sweeps, path length {}",
        sweeps,
        path.len()
    );

    Ok(MdpSolution {
        policy,
        values,
        path,
        divergence,
        iterations: sweeps,
        sweeps,
        elapsed: started.elapsed(),
    })
}
