use crossterm::style::{Color, Stylize};

use std::fmt;

/// Represents a cell in the grid, which can be either open or a wall.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridCell {
    Open,
    #[default]
    Wall,
}

impl GridCell {
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    pub fn is_open(self) -> bool {
        self == GridCell::Open
    }

    /// Export code for renderers: `0` for open, `1` for wall.
    pub fn code(self) -> u8 {
        match self {
            GridCell::Open => 0,
            GridCell::Wall => 1,
        }
    }
}

impl TryFrom<char> for GridCell {
    type Error = char;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            ' ' | '.' | '0' => Ok(GridCell::Open),
            '#' | '█' | '1' => Ok(GridCell::Wall),
            ch => Err(ch),
        }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tile = match self {
            GridCell::Open => Tile::Open,
            GridCell::Wall => Tile::Wall,
        };
        write!(f, "{}", tile)
    }
}

/// What a grid cell looks like once a solver result is laid over the maze.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    #[default]
    Open,
    /// A cell the solver visited without it ending up on the route.
    Explored,
    /// A cell on the solution route.
    Route,
    Entry,
    Exit,
}

impl From<GridCell> for Tile {
    fn from(cell: GridCell) -> Self {
        match cell {
            GridCell::Open => Tile::Open,
            GridCell::Wall => Tile::Wall,
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match self {
            Tile::Wall => "⬜".with(Color::White),
            Tile::Open => "  ".with(Color::Reset),
            Tile::Explored => "* ".with(Color::Blue),
            Tile::Route => "🟨".with(Color::Yellow),
            Tile::Entry => "🟩".with(Color::Green),
            Tile::Exit => "🟥".with(Color::Red),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            debug_assert_eq!(
                styled_symbol.content().width(),
                GridCell::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cells() {
        assert_eq!(GridCell::try_from('#'), Ok(GridCell::Wall));
        assert_eq!(GridCell::try_from('.'), Ok(GridCell::Open));
        assert_eq!(GridCell::try_from(' '), Ok(GridCell::Open));
        assert_eq!(GridCell::try_from('x'), Err('x'));
    }

    #[test]
    fn test_export_codes() {
        assert_eq!(GridCell::Open.code(), 0);
        assert_eq!(GridCell::Wall.code(), 1);
        assert_eq!(Tile::from(GridCell::Wall), Tile::Wall);
    }
}
