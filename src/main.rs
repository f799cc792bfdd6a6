use mazemdp::{
    generators::MazeConfig,
    logging,
    maze::Maze,
    solvers::{self, Heuristic, Solution, Solver},
};

fn read_line(input: &mut String) -> std::io::Result<&str> {
    input.clear();
    std::io::stdin().read_line(input)?;
    Ok(input.trim())
}

fn print_solution(maze: &Maze, solution: &Solution) {
    println!("{}", maze.overlay(&solution.path, &solution.explored));
    if solution.path.is_empty() {
        println!("No path found to the exit.");
    } else {
        println!("Maze solved! Path length: {}", solution.path.len());
    }
    println!("Explored cells: {}", solution.explored.len());
    println!("Loops: {}", solution.loops);
    println!("Elapsed: {:?}", solution.elapsed);
    if let Some(mdp) = &solution.mdp {
        println!("MDP iterations: {}, sweeps: {}", mdp.iterations, mdp.sweeps);
        if let Some(divergence) = mdp.divergence {
            println!(
                "Policy diverged at {:?} after {} steps",
                divergence.last_state, divergence.steps
            );
        }
    }
}

fn main() -> std::io::Result<()> {
    let _guard = logging::init();
    let mut input = String::new();

    println!("Enter maze dimensions (height width) in lattice cells:");
    let dims = read_line(&mut input)?
        .split_whitespace()
        .take(2)
        .filter_map(|s| s.parse::<usize>().ok())
        .collect::<Vec<_>>();
    let &[height, width] = dims.as_slice() else {
        eprintln!("Please enter two valid numbers for height and width.");
        return Ok(());
    };

    let mut config = MazeConfig {
        height,
        width,
        ..MazeConfig::default()
    };
    println!(
        "Branching probability (press Enter for {}):",
        config.branching_probability
    );
    let answer = read_line(&mut input)?;
    if !answer.is_empty() {
        match answer.parse::<f64>() {
            Ok(p) => config.branching_probability = p,
            Err(_) => {
                eprintln!("'{}' is not a number.", answer);
                return Ok(());
            }
        }
    }

    let maze = match config.generate() {
        Ok(maze) => maze,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(());
        }
    };
    println!("{}", maze);

    // Let user select the algorithm
    println!("Select maze solving algorithm:");
    let choices = Solver::all();
    for (i, solver) in choices.iter().enumerate() {
        println!("{}. {}", i + 1, solver);
    }
    let solver = match read_line(&mut input)?.parse::<usize>() {
        Ok(i) if (1..=choices.len()).contains(&i) => choices[i - 1].clone(),
        _ => {
            eprintln!("Invalid selection.");
            return Ok(());
        }
    };

    let solver = if let Solver::AStar(_) = solver {
        println!("Select heuristic:");
        for (i, heuristic) in Heuristic::ALL.iter().enumerate() {
            println!("{}. {}", i + 1, heuristic);
        }
        match read_line(&mut input)?.parse::<usize>() {
            Ok(i) if (1..=Heuristic::ALL.len()).contains(&i) => {
                Solver::AStar(Heuristic::ALL[i - 1])
            }
            _ => {
                eprintln!("Invalid selection.");
                return Ok(());
            }
        }
    } else {
        solver
    };

    match solvers::solve_maze(&maze, &solver) {
        Ok(solution) => print_solution(&maze, &solution),
        Err(e) => {
            tracing::info!("[main] {} failed: {}", solver, e);
            eprintln!("{} failed: {}", solver, e);
        }
    }
    Ok(())
}
