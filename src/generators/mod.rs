use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

mod dfs;

use dfs::randomized_dfs;

use crate::maze::{GridCell, Maze};

#[derive(Debug, Error, PartialEq)]
pub enum GenerateError {
    #[error("Maze dimensions must be at least 1x1 and fit in memory, got {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },
    #[error("Branching probability must be within [0, 1], got {probability}")]
    InvalidBranchingProbability { probability: f64 },
}

/// Get a random number generator, optionally seeded for reproducibility.
///
/// ChaCha output is specified independently of platform and crate version, so a seed always
/// yields the same maze.
pub fn get_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_os_rng(),
    }
}

/// Everything needed to reproduce a maze.
#[derive(Debug, Clone, PartialEq)]
pub struct MazeConfig {
    /// Lattice rows
    pub height: usize,
    /// Lattice columns
    pub width: usize,
    /// Chance of re-opening the current cell after carving out of it. Higher means more loops.
    pub branching_probability: f64,
    /// `None` draws a fresh seed from the OS.
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            height: 10,
            width: 10,
            branching_probability: 0.3,
            seed: None,
        }
    }
}

impl MazeConfig {
    pub fn square(size: usize) -> Self {
        Self {
            height: size,
            width: size,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn generate(&self) -> Result<Maze, GenerateError> {
        let mut rng = get_rng(self.seed);
        generate_maze(self.height, self.width, self.branching_probability, &mut rng)
    }
}

/// Generates a connected `(2 * height + 1) x (2 * width + 1)` maze with open entry and exit.
///
/// Inputs are validated before any randomness is drawn, so a rejected call leaves `rng`
/// untouched.
pub fn generate_maze<R: Rng + ?Sized>(
    height: usize,
    width: usize,
    branching_probability: f64,
    rng: &mut R,
) -> Result<Maze, GenerateError> {
    let fits = |n: usize| n.checked_mul(2).and_then(|n| n.checked_add(1));
    let area = fits(height)
        .zip(fits(width))
        .and_then(|(rows, cols)| rows.checked_mul(cols));
    if height == 0 || width == 0 || area.is_none() {
        return Err(GenerateError::InvalidDimensions { height, width });
    }
    if !(0.0..=1.0).contains(&branching_probability) {
        // NaN fails the range check too
        return Err(GenerateError::InvalidBranchingProbability {
            probability: branching_probability,
        });
    }

    let mut maze = Maze::new(height, width);
    let carved = randomized_dfs(&mut maze, height, width, branching_probability, rng);

    // Open the top and bottom boundary walls for the entry and exit
    maze.set(maze.entry(), GridCell::Open);
    maze.set(maze.exit(), GridCell::Open);

    tracing::debug!(
        "[generate] {}x{} maze, p={}, {} walls carved",
        height,
        width,
        branching_probability,
        carved
    );
    Ok(maze)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use super::*;
    use crate::maze::Coord;

    fn reachable_from_entry(maze: &Maze) -> HashSet<Coord> {
        let mut seen = HashSet::from([maze.entry()]);
        let mut queue = VecDeque::from([maze.entry()]);
        while let Some(cell) = queue.pop_front() {
            for (next, _) in maze.open_neighbors(cell) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let mut rng = get_rng(Some(1));
        assert_eq!(
            generate_maze(0, 3, 0.2, &mut rng),
            Err(GenerateError::InvalidDimensions {
                height: 0,
                width: 3
            })
        );
        assert_eq!(
            generate_maze(3, 0, 0.2, &mut rng),
            Err(GenerateError::InvalidDimensions {
                height: 3,
                width: 0
            })
        );
        assert!(generate_maze(usize::MAX, 1, 0.2, &mut rng).is_err());
        assert_eq!(
            generate_maze(3, 3, 1.5, &mut rng),
            Err(GenerateError::InvalidBranchingProbability { probability: 1.5 })
        );
        assert!(generate_maze(3, 3, -0.1, &mut rng).is_err());
        assert!(generate_maze(3, 3, f64::NAN, &mut rng).is_err());
    }

    #[test]
    fn test_every_open_cell_is_connected() {
        for seed in 0..20 {
            for &p in &[0.0, 0.3, 0.8, 1.0] {
                let config = MazeConfig {
                    height: 1 + (seed as usize % 7),
                    width: 1 + (seed as usize * 3 % 9),
                    branching_probability: p,
                    seed: Some(seed),
                };
                let maze = config.generate().unwrap();
                let reachable = reachable_from_entry(&maze);
                assert!(reachable.contains(&maze.exit()), "{config:?}");
                assert_eq!(
                    reachable.len(),
                    maze.open_cells().count(),
                    "every open cell should be reachable for {config:?}"
                );
            }
        }
    }

    #[test]
    fn test_seed_determinism() {
        let config = MazeConfig {
            height: 12,
            width: 9,
            branching_probability: 0.4,
            seed: Some(42),
        };
        let a = config.generate().unwrap();
        let b = config.generate().unwrap();
        assert_eq!(a.export(), b.export());

        let other = config.clone().with_seed(43);
        assert_ne!(a.export(), other.generate().unwrap().export());
    }

    #[test]
    fn test_seeded_maze_is_stable() {
        // Pinned output: a change here means seeds no longer reproduce published mazes
        let maze = MazeConfig::square(3).with_seed(1).generate().unwrap();
        assert_eq!(
            maze.export(),
            vec![
                vec![1, 0, 1, 1, 1, 1, 1],
                vec![1, 0, 0, 0, 1, 0, 1],
                vec![1, 1, 1, 0, 1, 0, 1],
                vec![1, 0, 0, 0, 1, 0, 1],
                vec![1, 0, 1, 1, 1, 0, 1],
                vec![1, 0, 0, 0, 0, 0, 1],
                vec![1, 1, 1, 1, 1, 0, 1],
            ]
        );

        let tree = generate_maze(3, 3, 0.0, &mut get_rng(Some(2024))).unwrap();
        assert_eq!(
            tree.export(),
            vec![
                vec![1, 0, 1, 1, 1, 1, 1],
                vec![1, 0, 0, 0, 0, 0, 1],
                vec![1, 1, 1, 1, 1, 0, 1],
                vec![1, 0, 0, 0, 0, 0, 1],
                vec![1, 0, 1, 1, 1, 1, 1],
                vec![1, 0, 0, 0, 0, 0, 1],
                vec![1, 1, 1, 1, 1, 0, 1],
            ]
        );
    }

    #[test]
    fn test_zero_probability_is_spanning_tree() {
        for seed in 0..10 {
            let (height, width) = (6, 8);
            let maze = generate_maze(height, width, 0.0, &mut get_rng(Some(seed))).unwrap();
            let lattice = height * width;
            // lattice cells + one carved wall per tree edge + entry and exit
            assert_eq!(maze.open_cells().count(), lattice + (lattice - 1) + 2);
        }
    }

    #[test]
    fn test_branching_adds_loops() {
        let (height, width) = (15, 15);
        let lattice = height * width;
        let open_with_loops = (0..10)
            .map(|seed| {
                generate_maze(height, width, 0.9, &mut get_rng(Some(seed)))
                    .unwrap()
                    .open_cells()
                    .count()
            })
            .max()
            .unwrap();
        assert!(open_with_loops > lattice + (lattice - 1) + 2);
    }

    #[test]
    fn test_single_cell_maze() {
        let maze = generate_maze(1, 1, 0.5, &mut get_rng(Some(7))).unwrap();
        assert_eq!(
            maze.export(),
            vec![vec![1, 0, 1], vec![1, 0, 1], vec![1, 0, 1]]
        );
    }
}
