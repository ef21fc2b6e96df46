use std::time::{Duration, Instant};

use serde::Serialize;

use crate::grid::{Grid, Position, Visitation};
use crate::strategy::SearchTree;

/// Summary of a successful search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathReport {
    /// Cells that got a predecessor during the run, plus the start.
    pub cells_visited: usize,
    /// Cells on the path, both ends included.
    pub path_length: usize,
    pub elapsed: Duration,
    /// The path itself, from start to goal.
    pub path: Vec<Position>,
}

/// Walks the predecessor links back from the goal, one hop at a time.
#[derive(Clone, Debug)]
pub struct PathTracer {
    start: Position,
    cursor: Position,
    hops: usize,
    path: Vec<Position>,
}

impl PathTracer {
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            cursor: end,
            hops: 0,
            path: vec![end],
        }
    }

    /// Follow one link. Every cell reached on the way, except the start, is
    /// marked [`Visitation::OnPath`]. Returns `false` when there was no link
    /// left to follow.
    pub fn advance(&mut self, grid: &mut Grid, tree: &SearchTree) -> bool {
        let Some(previous) = tree.predecessor(self.cursor) else {
            return false;
        };

        self.cursor = previous;
        self.hops += 1;
        self.path.push(previous);
        if previous != self.start {
            grid.mark(previous, Visitation::OnPath);
        }

        true
    }

    /// Number of cells on the path: one more than the hops taken.
    pub fn path_length(&self) -> usize {
        self.hops + 1
    }

    pub fn into_report(mut self, tree: &SearchTree, elapsed: Duration) -> PathReport {
        self.path.reverse();
        PathReport {
            cells_visited: tree.len() + 1,
            path_length: self.path_length(),
            elapsed,
            path: self.path,
        }
    }
}

/// Mark the path from `start` to `end` in one go, calling `on_step` after
/// every hop.
pub fn reconstruct(
    grid: &mut Grid,
    tree: &SearchTree,
    start: Position,
    end: Position,
    started: Instant,
    mut on_step: impl FnMut(&Grid),
) -> PathReport {
    let mut tracer = PathTracer::new(start, end);

    while tracer.advance(grid, tree) {
        on_step(grid);
    }

    tracer.into_report(tree, started.elapsed())
}
