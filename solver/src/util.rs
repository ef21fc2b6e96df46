//! Ready-made grid layouts, each with a start and an end already placed.

use crate::grid::{Grid, GridError, Position, Role};

/// No walls, start and end in opposite corners. On a single cell grid
/// that cell is both.
pub fn open(size: usize) -> Result<Grid, GridError> {
    let mut grid = Grid::new(size)?;
    grid.set_role(Position::new(0, 0), Role::Start)?;
    grid.set_role(Position::new(size - 1, size - 1), Role::End)?;
    Ok(grid)
}

/// Walls along the edge, start and end in opposite inner corners.
pub fn bordered(size: usize) -> Result<Grid, GridError> {
    if size < 3 {
        return Err(GridError::TooSmall { size, min: 3 });
    }

    let mut grid = Grid::new(size)?;
    grid.wall_border();
    grid.set_role(Position::new(1, 1), Role::Start)?;
    grid.set_role(Position::new(size - 2, size - 2), Role::End)?;
    Ok(grid)
}

/// A bordered grid where every other inner row is a wall with a single gap,
/// alternating between the right and the left side, so the only route snakes
/// back and forth from the top to the bottom.
pub fn serpentine(size: usize) -> Result<Grid, GridError> {
    let mut grid = bordered(size)?;

    let mut right = true;
    for row in (2..size - 2).step_by(2) {
        let gap = if right { size - 2 } else { 1 };
        for col in (1..size - 1).filter(|c| *c != gap) {
            grid.set_wall(Position::new(row, col))?;
        }
        right = !right;
    }

    Ok(grid)
}

/// No walls except four around the center, which holds the end. The start
/// sits in the top left corner and cannot reach it.
pub fn enclosed(size: usize) -> Result<Grid, GridError> {
    if size < 3 {
        return Err(GridError::TooSmall { size, min: 3 });
    }

    let mut grid = Grid::new(size)?;
    let center = Position::new(size / 2, size / 2);
    for wall in grid.neighbors(center)? {
        grid.set_wall(wall)?;
    }
    grid.set_role(Position::new(0, 0), Role::Start)?;
    grid.set_role(center, Role::End)?;
    Ok(grid)
}
