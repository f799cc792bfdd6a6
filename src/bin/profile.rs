use std::time::Duration;

use mazemdp::{
    generators::MazeConfig,
    logging,
    solvers::{Heuristic, Solver, solve_maze},
};

fn main() -> std::io::Result<()> {
    let _guard = logging::init();

    let mut args = std::env::args();
    args.next(); // Skip executable name
    let size = args.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(20);
    let num_iters = args.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(1);

    // Every solver once, then A* again under the remaining heuristics
    let mut solvers = Solver::all().to_vec();
    solvers.extend(
        Heuristic::ALL
            .into_iter()
            .filter(|&h| h != Heuristic::default())
            .map(Solver::AStar),
    );

    let mut totals = vec![(0usize, 0usize, Duration::ZERO, 0u64); solvers.len()];
    for seed in 0..num_iters {
        let maze = match MazeConfig::square(size).with_seed(seed).generate() {
            Ok(maze) => maze,
            Err(e) => {
                eprintln!("{}", e);
                return Ok(());
            }
        };
        tracing::info!("[profile] maze {} of {} ({}x{})", seed + 1, num_iters, size, size);
        for (solver, total) in solvers.iter().zip(totals.iter_mut()) {
            match solve_maze(&maze, solver) {
                Ok(solution) => {
                    total.0 += solution.path.len();
                    total.1 += solution.explored.len();
                    total.2 += solution.elapsed;
                    total.3 += 1;
                }
                Err(e) => tracing::info!("[profile] {} failed on seed {}: {}", solver, seed, e),
            }
        }
    }

    println!(
        "{:<32} {:>10} {:>10} {:>14}",
        "solver", "path", "explored", "time"
    );
    for (solver, (path, explored, elapsed, solved)) in solvers.iter().zip(totals) {
        if solved == 0 {
            println!("{:<32} {:>10}", solver.to_string(), "failed");
            continue;
        }
        let n = solved as usize;
        println!(
            "{:<32} {:>10} {:>10} {:>14?}",
            solver.to_string(),
            path / n,
            explored / n,
            elapsed / solved as u32
        );
    }
    Ok(())
}
