pub mod cell;
pub mod grid;

use std::collections::HashSet;

use thiserror::Error;

pub use cell::{GridCell, Tile};
pub use grid::Grid;

/// A grid coordinate as `(row, col)`.
pub type Coord = (usize, usize);

/// The four moves available from any cell.
///
/// The discriminant doubles as the action code handed to renderers, and `Direction::ALL`
/// is the neighbor order every solver iterates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Steps one cell in this direction, or `None` when that would underflow.
    /// Overflow past the grid is left to the caller's bounds check.
    pub fn step(self, (row, col): Coord) -> Option<Coord> {
        match self {
            Direction::Up => Some((row.checked_sub(1)?, col)),
            Direction::Down => Some((row.checked_add(1)?, col)),
            Direction::Left => Some((row, col.checked_sub(1)?)),
            Direction::Right => Some((row, col.checked_add(1)?)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arrow = match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Left => "←",
            Direction::Right => "→",
        };
        write!(f, "{}", arrow)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Invalid character '{ch}' found at ({row},{col})")]
    InvalidCharacter { ch: char, row: usize, col: usize },
    #[error("A maze needs at least 2 rows and 3 columns, got {rows}x{cols}")]
    TooSmall { rows: usize, cols: usize },
    #[error("Entry or exit cell at {coord:?} is a wall")]
    ClosedEndpoint { coord: Coord },
}

/// A rectangular maze of open cells and walls with a fixed entry and exit.
///
/// Generated mazes embed a `height x width` lattice of logical cells into a
/// `(2 * height + 1) x (2 * width + 1)` grid: lattice cell `(i, j)` sits at `(2i + 1, 2j + 1)`
/// and the cells in between are walls until carved.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    grid: Grid<GridCell>,
    entry: Coord,
    exit: Coord,
}

impl Maze {
    /// Creates the un-carved maze for a `height x width` lattice: every lattice cell is open,
    /// every cell between them is a wall.
    pub(crate) fn new(height: usize, width: usize) -> Self {
        // n cells in each dimension -> n + 1 walls -> 2n + 1 total
        let rows = height * 2 + 1;
        let cols = width * 2 + 1;
        let mut grid = Grid::new(rows, cols, GridCell::Wall);
        (0..height).for_each(|i| {
            (0..width).for_each(|j| grid.set((2 * i + 1, 2 * j + 1), GridCell::Open));
        });
        Maze {
            grid,
            entry: (0, 1),
            exit: (rows - 1, cols - 2),
        }
    }

    /// Parses a hand-built maze, one line per row: `#` is a wall, `.` or space is open.
    ///
    /// Entry and exit follow the generated layout: `(0, 1)` and `(rows - 1, cols - 2)`.
    pub fn from_text(text: &str) -> Result<Self, MazeParseError> {
        let lines = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let Some(first) = lines.first() else {
            return Err(MazeParseError::EmptyInput);
        };

        let rows = lines.len();
        let cols = first.chars().count();
        if rows < 2 || cols < 3 {
            return Err(MazeParseError::TooSmall { rows, cols });
        }

        let mut grid = Grid::new(rows, cols, GridCell::Wall);
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(MazeParseError::RaggedRow {
                    row,
                    found,
                    expected: cols,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = GridCell::try_from(ch)
                    .map_err(|ch| MazeParseError::InvalidCharacter { ch, row, col })?;
                grid.set((row, col), cell);
            }
        }

        let maze = Maze {
            grid,
            entry: (0, 1),
            exit: (rows - 1, cols - 2),
        };
        for coord in [maze.entry, maze.exit] {
            if !maze.is_open(coord) {
                return Err(MazeParseError::ClosedEndpoint { coord });
            }
        }
        Ok(maze)
    }

    pub fn grid(&self) -> &Grid<GridCell> {
        &self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn entry(&self) -> Coord {
        self.entry
    }

    pub fn exit(&self) -> Coord {
        self.exit
    }

    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        self.grid.is_in_bounds(coord)
    }

    /// Out-of-bounds coordinates count as walls.
    pub fn is_open(&self, coord: Coord) -> bool {
        self.grid.get(coord).is_some_and(|cell| cell.is_open())
    }

    pub(crate) fn set(&mut self, coord: Coord, cell: GridCell) {
        self.grid.set(coord, cell);
    }

    pub fn open_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.grid.coords().filter(|&c| self.is_open(c))
    }

    /// The in-bounds cell one step away in `direction`, open or not.
    pub fn neighbor(&self, coord: Coord, direction: Direction) -> Option<Coord> {
        direction.step(coord).filter(|&c| self.is_in_bounds(c))
    }

    /// Open neighbors of a cell in `Direction::ALL` order.
    pub fn open_neighbors(&self, coord: Coord) -> impl Iterator<Item = (Coord, Direction)> + '_ {
        Direction::ALL.into_iter().filter_map(move |direction| {
            self.neighbor(coord, direction)
                .filter(|&c| self.is_open(c))
                .map(|c| (c, direction))
        })
    }

    /// Row-major matrix with `0` for open cells and `1` for walls.
    pub fn export(&self) -> Vec<Vec<u8>> {
        self.grid
            .row_slices()
            .map(|row| row.iter().map(|cell| cell.code()).collect())
            .collect()
    }

    /// Lays a solver result over the maze for rendering.
    pub fn overlay(&self, path: &[Coord], explored: &HashSet<Coord>) -> Grid<Tile> {
        let mut tiles = self.grid.map(|&cell| Tile::from(cell));
        for &coord in explored {
            if self.is_open(coord) {
                tiles.set(coord, Tile::Explored);
            }
        }
        for &coord in path {
            tiles.set(coord, Tile::Route);
        }
        tiles.set(self.entry, Tile::Entry);
        tiles.set(self.exit, Tile::Exit);
        tiles
    }
}

impl std::fmt::Display for Maze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tiles = self.grid.map(|&cell| Tile::from(cell));
        tiles.set(self.entry, Tile::Entry);
        tiles.set(self.exit, Tile::Exit);
        write!(f, "{}", tiles)
    }
}

impl std::ops::Index<Coord> for Maze {
    type Output = GridCell;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.grid[index]
    }
}

/// Checks that `path` runs from the maze entry to its exit through 4-adjacent open cells.
pub fn is_valid_path(maze: &Maze, path: &[Coord]) -> bool {
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        return false;
    };
    first == maze.entry()
        && last == maze.exit()
        && path.iter().all(|&c| maze.is_open(c))
        && path
            .windows(2)
            .all(|pair| pair[0].0.abs_diff(pair[1].0) + pair[0].1.abs_diff(pair[1].1) == 1)
}
