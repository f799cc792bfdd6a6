use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
    time::Instant,
};

use ordered_float::OrderedFloat;

use super::{Heuristic, SearchOutcome, walk_back};
use crate::maze::{Coord, Direction, Maze};

/// A node of the A* search tree. Lives in an append-only arena and points at its parent by
/// arena index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchNode {
    pub coord: Coord,
    /// Steps taken from the start
    pub g: usize,
    /// Estimated steps left to the goal
    pub h: f64,
    pub f: f64,
    pub parent: Option<usize>,
}

/// Heap entry. Ordered by `f`, then by insertion sequence so equal-`f` nodes come out in the
/// order they went in, whatever the heap does internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: OrderedFloat<f64>,
    seq: u64,
    node: usize,
}

/// What to do when a cell that is already open is reached again with a smaller `g`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenSetUpdate {
    /// Ignore it. An open cell keeps the `g` it was first discovered with, so the search may
    /// settle for a longer path than the heuristic would allow. Expansion counts are comparable
    /// across runs and heuristics in this mode.
    #[default]
    Never,
    /// Push a fresh node with the smaller `g`; the outdated entry is dropped when it is popped
    /// after the cell is already closed.
    LazyDecreaseKey,
}

/// A configured A* run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AStar {
    heuristic: Heuristic,
    open_set_update: OpenSetUpdate,
}

impl AStar {
    pub fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            open_set_update: OpenSetUpdate::default(),
        }
    }

    pub fn with_open_set_update(mut self, open_set_update: OpenSetUpdate) -> Self {
        self.open_set_update = open_set_update;
        self
    }

    fn node(&self, coord: Coord, g: usize, parent: Option<usize>, goal: Coord) -> SearchNode {
        let h = self.heuristic.estimate(coord, goal);
        SearchNode {
            coord,
            g,
            h,
            f: g as f64 + h,
            parent,
        }
    }

    pub fn search(&self, maze: &Maze, start: Coord, goal: Coord) -> SearchOutcome {
        let started = Instant::now();
        let mut arena: Vec<SearchNode> = Vec::new();
        let mut open: BinaryHeap<Reverse<OpenEntry>> = BinaryHeap::new();
        let mut seq: u64 = 0;
        // Best g of every cell currently in the open set
        let mut open_g: HashMap<Coord, usize> = HashMap::new();
        let mut closed: HashSet<Coord> = HashSet::new();
        let mut expansions = 0;

        let mut path = Vec::new();
        if maze.is_open(start) {
            let node = self.node(start, 0, None, goal);
            push_open(&mut arena, &mut open, &mut seq, node);
            open_g.insert(start, 0);
        }

        while let Some(Reverse(entry)) = open.pop() {
            let SearchNode { coord, g, .. } = arena[entry.node];
            if closed.contains(&coord) {
                continue;
            }
            open_g.remove(&coord);
            closed.insert(coord);

            if coord == goal {
                path = walk_back(entry.node, |i| arena[i].parent)
                    .into_iter()
                    .map(|i| arena[i].coord)
                    .collect();
                break;
            }

            for direction in Direction::ALL {
                expansions += 1;
                let Some(next) = maze
                    .neighbor(coord, direction)
                    .filter(|&c| maze.is_open(c))
                else {
                    continue;
                };
                if closed.contains(&next) {
                    continue;
                }
                let next_g = g + 1;
                if let Some(&known_g) = open_g.get(&next) {
                    let improves = next_g < known_g;
                    if self.open_set_update == OpenSetUpdate::Never || !improves {
                        continue;
                    }
                }
                open_g.insert(next, next_g);
                let node = self.node(next, next_g, Some(entry.node), goal);
                push_open(&mut arena, &mut open, &mut seq, node);
            }
        }

        if path.is_empty() {
            tracing::debug!(
                "[astar] open set exhausted after {} expansions without reaching {:?}",
                expansions,
                goal
            );
        }
        tracing::debug!(
            "[astar] {} heuristic: {} nodes allocated, {} closed",
            self.heuristic,
            arena.len(),
            closed.len()
        );

        SearchOutcome {
            path,
            explored: closed,
            expansions,
            elapsed: started.elapsed(),
        }
    }
}

/// Appends `node` to the arena and queues it behind every entry pushed before it.
fn push_open(
    arena: &mut Vec<SearchNode>,
    open: &mut BinaryHeap<Reverse<OpenEntry>>,
    seq: &mut u64,
    node: SearchNode,
) {
    open.push(Reverse(OpenEntry {
        f: OrderedFloat(node.f),
        seq: *seq,
        node: arena.len(),
    }));
    *seq += 1;
    arena.push(node);
}

/// A* from `start` to `goal` with the default open-set behaviour.
pub fn search(maze: &Maze, start: Coord, goal: Coord, heuristic: Heuristic) -> SearchOutcome {
    AStar::new(heuristic).search(maze, start, goal)
}

pub fn solve_astar(maze: &Maze, heuristic: Heuristic) -> SearchOutcome {
    search(maze, maze.entry(), maze.exit(), heuristic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{generate_maze, get_rng};
    use crate::maze::is_valid_path;
    use crate::solvers::solve_bfs;

    /// Combined overestimates enough here to lure the search down the long way round.
    const ADVERSARIAL: &str = "\
#.#####
#.....#
#.#.#.#
#.#.#.#
#.###.#
#.#...#
#.#.#.#
#...#.#
#####.#";

    #[test]
    fn test_combined_is_not_optimal() {
        let maze = Maze::from_text(ADVERSARIAL).unwrap();
        let bfs = solve_bfs(&maze);
        assert_eq!(bfs.path.len(), 13);
        assert_eq!(solve_astar(&maze, Heuristic::Manhattan).path.len(), 13);

        let combined = solve_astar(&maze, Heuristic::Combined);
        assert!(is_valid_path(&maze, &combined.path));
        assert_eq!(combined.path.len(), 17);
    }

    #[test]
    fn test_manhattan_matches_bfs() {
        for seed in 0..30 {
            let maze = generate_maze(10, 14, 0.5, &mut get_rng(Some(seed))).unwrap();
            let bfs = solve_bfs(&maze).path.len();
            let astar = solve_astar(&maze, Heuristic::Manhattan);
            assert!(is_valid_path(&maze, &astar.path));
            assert_eq!(astar.path.len(), bfs, "seed {seed}");

            let lazy = AStar::new(Heuristic::Manhattan)
                .with_open_set_update(OpenSetUpdate::LazyDecreaseKey)
                .search(&maze, maze.entry(), maze.exit());
            assert_eq!(lazy.path.len(), bfs, "seed {seed}");
        }
    }

    #[test]
    fn test_closed_set_and_expansions() {
        let maze = Maze::from_text(
            "\
#.###
#...#
###.#",
        )
        .unwrap();
        let outcome = solve_astar(&maze, Heuristic::Manhattan);
        assert_eq!(outcome.path, vec![(0, 1), (1, 1), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(outcome.explored.len(), 5);
        // The goal is closed but not expanded
        assert_eq!(outcome.expansions, 4 * 4);
    }

    #[test]
    fn test_unreachable_goal() {
        let maze = Maze::from_text(
            "\
#.###
#..##
###.#",
        )
        .unwrap();
        let outcome = solve_astar(&maze, Heuristic::Euclidean);
        assert!(!outcome.is_solved());
        assert_eq!(outcome.explored.len(), 3);
    }

    #[test]
    fn test_equal_f_ties_are_deterministic() {
        // An open room: every monotone path has the same f under Manhattan
        let maze = Maze::from_text(
            "\
#.###
#...#
#...#
#...#
###.#",
        )
        .unwrap();
        let first = solve_astar(&maze, Heuristic::Manhattan);
        let second = solve_astar(&maze, Heuristic::Manhattan);
        assert_eq!(first.path, second.path);
        assert_eq!(first.expansions, second.expansions);
        assert_eq!(first.path.len(), 7);
        // Down is tried before Right, and was inserted first among the tied nodes
        assert_eq!(first.path[2], (2, 1));
    }

    #[test]
    fn test_entry_ordering() {
        let a = OpenEntry {
            f: OrderedFloat(3.0),
            seq: 5,
            node: 0,
        };
        let b = OpenEntry {
            f: OrderedFloat(3.0),
            seq: 6,
            node: 0,
        };
        let c = OpenEntry {
            f: OrderedFloat(2.5),
            seq: 9,
            node: 1,
        };
        assert!(a < b);
        assert!(c < a);
    }
}
