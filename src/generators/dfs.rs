use rand::Rng;

use crate::maze::{Coord, Direction, Grid, GridCell, Maze};

/// Lattice cell -> grid cell.
fn embed((i, j): Coord) -> Coord {
    (2 * i + 1, 2 * j + 1)
}

/// The grid cell separating two adjacent lattice cells.
fn wall_between(a: Coord, b: Coord) -> Coord {
    (a.0 + b.0 + 1, a.1 + b.1 + 1)
}

/// Carves passages with a randomized depth-first walk over the lattice, returning how many walls
/// were removed.
///
/// After each carve the current cell loses its visited mark with probability
/// `branching_probability`, so a later branch may break back into it and close a loop.
/// Only walls that are still standing can be carved, which bounds the walk by the number of
/// interior walls even when `branching_probability` is 1.
pub(super) fn randomized_dfs<R: Rng + ?Sized>(
    maze: &mut Maze,
    height: usize,
    width: usize,
    branching_probability: f64,
    rng: &mut R,
) -> usize {
    let mut visited = Grid::new(height, width, false);
    let start: Coord = (0, 0);
    visited[start] = true;

    // The stack will keep only lattice cells
    let mut stack = vec![start];
    let mut carved = 0;

    while let Some(&cell) = stack.last() {
        let neighbors = Direction::ALL
            .into_iter()
            .filter_map(|direction| direction.step(cell))
            .filter(|&c| visited.is_in_bounds(c) && !visited[c])
            .filter(|&c| !maze.is_open(wall_between(cell, c)))
            .collect::<Vec<_>>();

        if neighbors.is_empty() {
            stack.pop();
            continue;
        }

        let neighbor = neighbors[rng.random_range(0..neighbors.len())];
        maze.set(wall_between(cell, neighbor), GridCell::Open);
        carved += 1;
        visited[neighbor] = true;
        // Carve the maze in that neighbor's direction next; the cell stays below it so we can
        // look at its other neighbors later
        stack.push(neighbor);

        if rng.random_bool(branching_probability) {
            visited[cell] = false;
        }
    }

    debug_assert!(
        (0..height).all(|i| (0..width).all(|j| maze.is_open(embed((i, j))))),
        "lattice cells are never walled"
    );
    carved
}
