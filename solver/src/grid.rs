use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("position {position} is outside of the {size}x{size} grid")]
    InvalidPosition { position: Position, size: usize },

    #[error("a grid needs at least one cell")]
    EmptyGrid,

    #[error("grid of size {size} is too small for this layout (needs at least {min})")]
    TooSmall { size: usize, min: usize },

    #[error("could not parse grid: {0}")]
    Parse(String),
}

/// A 0-indexed (row, col) location on a [`Grid`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl FromStr for Position {
    type Err = GridError;

    /// Parses `row,col`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(',')
            .ok_or_else(|| GridError::Parse(format!("expected `row,col`, got `{}`", s)))?;

        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| GridError::Parse(format!("invalid coordinate `{}`: {}", v, e)))
        };

        Ok(Position::new(parse(row)?, parse(col)?))
    }
}

/// How far a search has gotten with a cell. Only the running search writes this.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Visitation {
    #[default]
    Unvisited,
    /// Discovered and waiting in the frontier
    Frontier,
    /// Expanded
    Visited,
    /// Part of the reconstructed path
    OnPath,
}

/// Role assigned by whoever edits the grid. The search never looks at it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    None,
    Start,
    End,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    position: Position,
    wall: bool,
    start: bool,
    end: bool,
    state: Visitation,
}

impl Cell {
    fn new(position: Position) -> Self {
        Self {
            position,
            wall: false,
            start: false,
            end: false,
            state: Visitation::Unvisited,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_wall(&self) -> bool {
        self.wall
    }

    pub fn is_start(&self) -> bool {
        self.start
    }

    pub fn is_end(&self) -> bool {
        self.end
    }

    pub fn state(&self) -> Visitation {
        self.state
    }

    fn reset(&mut self) {
        self.wall = false;
        self.start = false;
        self.end = false;
        self.state = Visitation::Unvisited;
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self.state {
            _ if self.wall => '#',
            _ if self.start => 'S',
            _ if self.end => 'G',
            Visitation::Unvisited => '.',
            Visitation::Frontier => 'o',
            Visitation::Visited => 'x',
            Visitation::OnPath => '*',
        };
        write!(f, "{}", c)
    }
}

/// A fixed N×N square of cells.
///
/// Adjacency is never cached: [`Grid::neighbors`] looks at the current walls
/// every time it is asked, so edits between searches are always picked up.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a `size`×`size` grid with no walls and every cell unvisited.
    pub fn new(size: usize) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::EmptyGrid);
        }

        let cells = (0..size * size)
            .map(|i| Cell::new(Position::new(i / size, i % size)))
            .collect();

        Ok(Self { size, cells })
    }

    /// The side length N.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    fn checked_index(&self, pos: Position) -> Result<usize, GridError> {
        if self.contains(pos) {
            Ok(self.index(pos))
        } else {
            Err(GridError::InvalidPosition {
                position: pos,
                size: self.size,
            })
        }
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        pos.row * self.size + pos.col
    }

    pub fn cell(&self, pos: Position) -> Result<&Cell, GridError> {
        let i = self.checked_index(pos)?;
        Ok(&self.cells[i])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn set_wall(&mut self, pos: Position) -> Result<(), GridError> {
        let i = self.checked_index(pos)?;
        self.cells[i].wall = true;
        Ok(())
    }

    /// Assign a role to a cell. There is at most one start and one end, so
    /// handing out `Start` or `End` takes it away from the previous holder.
    /// A single cell may be both. `Role::None` drops both roles from `pos`.
    pub fn set_role(&mut self, pos: Position, role: Role) -> Result<(), GridError> {
        let i = self.checked_index(pos)?;
        match role {
            Role::None => {
                self.cells[i].start = false;
                self.cells[i].end = false;
            }
            Role::Start => {
                for cell in &mut self.cells {
                    cell.start = false;
                }
                self.cells[i].start = true;
            }
            Role::End => {
                for cell in &mut self.cells {
                    cell.end = false;
                }
                self.cells[i].end = true;
            }
        }
        Ok(())
    }

    /// Reset a single cell: no wall, no role, unvisited.
    pub fn clear(&mut self, pos: Position) -> Result<(), GridError> {
        let i = self.checked_index(pos)?;
        self.cells[i].reset();
        Ok(())
    }

    /// Reset every cell, as if the grid had just been built.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }

    /// Forget the trace of previous searches while keeping walls and roles.
    pub fn reset_visitation(&mut self) {
        for cell in &mut self.cells {
            cell.state = Visitation::Unvisited;
        }
    }

    /// Turn every cell on the outer edge into a wall.
    pub fn wall_border(&mut self) {
        let last = self.size - 1;
        for cell in &mut self.cells {
            let p = cell.position;
            if p.row == 0 || p.col == 0 || p.row == last || p.col == last {
                cell.wall = true;
            }
        }
    }

    pub fn start(&self) -> Option<Position> {
        self.cells.iter().find(|c| c.is_start()).map(|c| c.position)
    }

    pub fn end(&self) -> Option<Position> {
        self.cells.iter().find(|c| c.is_end()).map(|c| c.position)
    }

    /// The open cells next to `pos`, in south, north, east, west order.
    pub fn neighbors(&self, pos: Position) -> Result<Vec<Position>, GridError> {
        self.checked_index(pos)?;
        Ok(self.neighbors_of(pos).collect())
    }

    /// Same as [`Grid::neighbors`] for a position already known to be valid.
    pub(crate) fn neighbors_of(&self, node: Position) -> impl Iterator<Item = Position> {
        let mut points = Vec::with_capacity(4);

        if node.row < self.size - 1 {
            points.push(Position::new(node.row + 1, node.col));
        }
        if node.row > 0 {
            points.push(Position::new(node.row - 1, node.col));
        }
        if node.col < self.size - 1 {
            points.push(Position::new(node.row, node.col + 1));
        }
        if node.col > 0 {
            points.push(Position::new(node.row, node.col - 1));
        }

        // filter to only keep open cells
        points.retain(|p| !self.cells[self.index(*p)].wall);

        points.into_iter()
    }

    pub(crate) fn mark(&mut self, pos: Position, state: Visitation) {
        let i = self.index(pos);
        self.cells[i].state = state;
    }

    /// Create a per-cell storage with the same dimensions as this grid.
    pub fn create_storage<T: Clone>(&self, value: T) -> CellMap<T> {
        CellMap {
            size: self.size,
            values: vec![value; self.size * self.size],
        }
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.size) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Reads a square block of characters, one row per line. `#` or `X` is a
    /// wall, `S` the start, `G` or `E` the end; `.`, ` `, `o`, `x` and `*` are
    /// open cells. Blank lines are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().filter(|l| !l.trim().is_empty()).collect();
        let mut grid = Grid::new(rows.len())?;

        for (row, line) in rows.iter().enumerate() {
            let width = line.chars().count();
            if width != grid.size {
                return Err(GridError::Parse(format!(
                    "row {} has {} cells, expected {}",
                    row, width, grid.size
                )));
            }

            for (col, c) in line.chars().enumerate() {
                let pos = Position::new(row, col);
                match c {
                    '#' | 'X' => grid.set_wall(pos)?,
                    'S' => grid.set_role(pos, Role::Start)?,
                    'G' | 'E' => grid.set_role(pos, Role::End)?,
                    '.' | ' ' | 'o' | 'x' | '*' => {}
                    other => {
                        return Err(GridError::Parse(format!(
                            "unexpected character `{}` at {}",
                            other, pos
                        )))
                    }
                }
            }
        }

        Ok(grid)
    }
}

/// Dense per-cell storage for the bookkeeping of a single search run.
#[derive(Clone, Debug)]
pub struct CellMap<T> {
    size: usize,
    values: Vec<T>,
}

impl<T> Default for CellMap<T> {
    fn default() -> Self {
        Self {
            size: 0,
            values: Vec::new(),
        }
    }
}

impl<T> CellMap<T> {
    #[inline]
    pub fn get(&self, pos: Position) -> &T {
        &self.values[pos.row * self.size + pos.col]
    }

    #[inline]
    pub fn get_mut(&mut self, pos: Position) -> &mut T {
        &mut self.values[pos.row * self.size + pos.col]
    }
}
