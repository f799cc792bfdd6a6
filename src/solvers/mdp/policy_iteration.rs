use std::time::Instant;

use super::{MazeMdp, MdpConfig, MdpError, MdpSolution, Phase, Policy, ValueFunction};
use crate::maze::Maze;

/// Sweeps `V(s) <- R(s) + gamma * V(s')` under `policy` until the largest change drops below
/// `theta`. Returns the number of sweeps it took.
fn evaluate(mdp: &MazeMdp, policy: &Policy, values: &mut ValueFunction) -> Result<usize, MdpError> {
    let mut sweeps = 0;
    loop {
        if sweeps == mdp.max_iterations() {
            return Err(MdpError::NonConvergence {
                phase: Phase::PolicyEvaluation,
                iterations: sweeps,
            });
        }
        sweeps += 1;

        let mut delta: f64 = 0.0;
        for &state in mdp.states() {
            let Some(action) = policy[state] else {
                continue;
            };
            let value = mdp.q_value(values, state, action);
            delta = delta.max((value - values[state]).abs());
            values[state] = value;
        }
        if delta < mdp.theta() {
            return Ok(sweeps);
        }
    }
}

/// Makes `policy` greedy with respect to `values`. Returns how many cells changed action.
fn improve(mdp: &MazeMdp, policy: &mut Policy, values: &ValueFunction) -> usize {
    let mut changed = 0;
    for state in mdp.maze().open_cells() {
        let (best, _) = mdp.greedy(values, state);
        if policy[state] != Some(best) {
            policy[state] = Some(best);
            changed += 1;
        }
    }
    changed
}

/// Solves the maze by alternating full policy evaluation with greedy improvement until no
/// action changes.
pub fn policy_iteration(maze: &Maze, config: &MdpConfig) -> Result<MdpSolution, MdpError> {
    let started = Instant::now();
    let mdp = MazeMdp::new(maze, config)?;
    let mut policy = mdp.initial_policy();
    let mut values = mdp.initial_values();

    let mut iterations = 0;
    let mut sweeps = 0;
    loop {
        if iterations == mdp.max_iterations() {
            tracing::info!("[pit] policy still changing after {} rounds", iterations);
            return Err(MdpError::NonConvergence {
                phase: Phase::PolicyImprovement,
                iterations,
            });
        }
        iterations += 1;

        let evaluation_sweeps = evaluate(&mdp, &policy, &mut values).inspect_err(|_| {
            tracing::info!("[pit] evaluation did not converge in round {}", iterations);
        })?;
        sweeps += evaluation_sweeps;

        let changed = improve(&mdp, &mut policy, &values);
        tracing::debug!(
            "[pit] round {}: {} evaluation sweeps, {} actions changed",
            iterations,
            evaluation_sweeps,
            changed
        );
        if changed == 0 {
            break;
        }
    }

    let (path, divergence) = mdp.route(&policy)?;
    tracing::debug!(
        "[pit] stable after {} rounds ({} sweeps), path length {}",
        iterations,
        sweeps,
        path.len()
    );

    Ok(MdpSolution {
        policy,
        values,
        path,
        divergence,
        iterations,
        sweeps,
        elapsed: started.elapsed(),
    })
}
