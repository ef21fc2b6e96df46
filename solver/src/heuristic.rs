use crate::grid::Position;

/// Estimate of the remaining cost between two positions. Must never
/// overestimate the number of moves actually needed.
pub type Heuristic = fn(Position, Position) -> usize;

/// Manhattan (L1) distance, exact on an open 4-connected grid.
#[inline]
pub fn manhattan(a: Position, b: Position) -> usize {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}
