use std::{
    collections::{HashMap, VecDeque},
    time::Instant,
};

use super::{SearchOutcome, walk_back};
use crate::maze::{Coord, Direction, Maze};

/// Frontier discipline for uninformed traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// LIFO stack: follows one corridor as deep as it goes.
    Dfs,
    /// FIFO queue: finds a path with the fewest steps.
    Bfs,
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Dfs => write!(f, "dfs"),
            Order::Bfs => write!(f, "bfs"),
        }
    }
}

/// The container a traversal pulls its next cell from.
trait Frontier {
    fn put(&mut self, coord: Coord);
    fn take(&mut self) -> Option<Coord>;
}

impl Frontier for Vec<Coord> {
    fn put(&mut self, coord: Coord) {
        self.push(coord);
    }

    fn take(&mut self) -> Option<Coord> {
        self.pop()
    }
}

impl Frontier for VecDeque<Coord> {
    fn put(&mut self, coord: Coord) {
        self.push_back(coord);
    }

    fn take(&mut self) -> Option<Coord> {
        self.pop_front()
    }
}

fn traverse(maze: &Maze, start: Coord, goal: Coord, frontier: &mut impl Frontier) -> SearchOutcome {
    let started = Instant::now();
    // Records where each cell was first discovered from. Never overwritten.
    let mut parents: HashMap<Coord, Option<Coord>> = HashMap::from([(start, None)]);
    let mut expansions = 0;
    frontier.put(start);

    let mut path = Vec::new();
    while let Some(cell) = frontier.take() {
        if cell == goal {
            path = walk_back(goal, |c| parents.get(&c).copied().flatten());
            break;
        }

        for direction in Direction::ALL {
            expansions += 1;
            let Some(next) = maze.neighbor(cell, direction) else {
                continue;
            };
            if maze.is_open(next) && !parents.contains_key(&next) {
                parents.insert(next, Some(cell));
                frontier.put(next);
            }
        }
    }

    SearchOutcome {
        path,
        explored: parents.into_keys().collect(),
        expansions,
        elapsed: started.elapsed(),
    }
}

/// Uninformed search from `start` to `goal`.
///
/// Both orders try neighbors in `Direction::ALL` order and count every direction tried as an
/// expansion, whether or not it leads anywhere new.
pub fn search(maze: &Maze, start: Coord, goal: Coord, order: Order) -> SearchOutcome {
    if !maze.is_open(start) {
        tracing::debug!("[{}] start {:?} is not an open cell", order, start);
        return SearchOutcome {
            path: Vec::new(),
            explored: Default::default(),
            expansions: 0,
            elapsed: Default::default(),
        };
    }

    let outcome = match order {
        Order::Dfs => traverse(maze, start, goal, &mut Vec::new()),
        Order::Bfs => traverse(maze, start, goal, &mut VecDeque::new()),
    };
    if !outcome.is_solved() {
        tracing::debug!(
            "[{}] frontier exhausted after {} expansions without reaching {:?}",
            order,
            outcome.expansions,
            goal
        );
    }
    outcome
}

pub fn solve_dfs(maze: &Maze) -> SearchOutcome {
    search(maze, maze.entry(), maze.exit(), Order::Dfs)
}

pub fn solve_bfs(maze: &Maze) -> SearchOutcome {
    search(maze, maze.entry(), maze.exit(), Order::Bfs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{generate_maze, get_rng};
    use crate::maze::is_valid_path;

    const CORRIDOR: &str = "\
#.###
#...#
###.#";

    #[test]
    fn test_corridor() {
        let maze = Maze::from_text(CORRIDOR).unwrap();
        let expected = vec![(0, 1), (1, 1), (1, 2), (1, 3), (2, 3)];
        for order in [Order::Dfs, Order::Bfs] {
            let outcome = search(&maze, maze.entry(), maze.exit(), order);
            assert_eq!(outcome.path, expected);
            assert_eq!(outcome.explored.len(), 5);
        }
    }

    #[test]
    fn test_expansions_count_every_direction() {
        let maze = Maze::from_text(CORRIDOR).unwrap();
        let outcome = solve_bfs(&maze);
        // Four cells are expanded before the exit is popped
        assert_eq!(outcome.expansions, 4 * 4);
    }

    #[test]
    fn test_unreachable_exit() {
        let maze = Maze::from_text(
            "\
#.###
#..##
###.#",
        )
        .unwrap();
        for order in [Order::Dfs, Order::Bfs] {
            let outcome = search(&maze, maze.entry(), maze.exit(), order);
            assert!(!outcome.is_solved());
            assert_eq!(
                outcome.explored,
                [(0, 1), (1, 1), (1, 2)].into_iter().collect()
            );
        }
    }

    #[test]
    fn test_bfs_is_never_longer_than_dfs() {
        for seed in 0..10 {
            let maze = generate_maze(10, 10, 0.5, &mut get_rng(Some(seed))).unwrap();
            let dfs = solve_dfs(&maze);
            let bfs = solve_bfs(&maze);
            assert!(is_valid_path(&maze, &dfs.path));
            assert!(is_valid_path(&maze, &bfs.path));
            assert!(bfs.path.len() <= dfs.path.len());
        }
    }

    #[test]
    fn test_bfs_reaches_every_open_cell() {
        let maze = generate_maze(8, 6, 0.3, &mut get_rng(Some(11))).unwrap();
        // Searching for an unreachable goal floods the whole maze
        let outcome = search(&maze, maze.entry(), (0, 0), Order::Bfs);
        assert!(!outcome.is_solved());
        assert_eq!(outcome.explored.len(), maze.open_cells().count());
    }

    #[test]
    fn test_deterministic_runs() {
        let maze = generate_maze(9, 9, 0.4, &mut get_rng(Some(8))).unwrap();
        assert_eq!(solve_dfs(&maze).path, solve_dfs(&maze).path);
        assert_eq!(solve_dfs(&maze).expansions, solve_dfs(&maze).expansions);
    }
}
