//! Step-by-step shortest path search on a square grid.
//!
//! A [`Grid`] holds walls, the start/end roles set by whoever edits it, and
//! the [`Visitation`] trace left behind by searches. A [`PathFinder`] runs
//! one of the [`Algorithm`]s over it one expansion at a time, so that a
//! renderer can redraw between steps:
//!
//! ```
//! use solver::{search, Algorithm, Grid, Position};
//!
//! let mut grid = Grid::new(5).unwrap();
//! grid.wall_border();
//!
//! let outcome = search(
//!     &mut grid,
//!     Algorithm::AStar,
//!     Position::new(1, 1),
//!     Position::new(3, 3),
//!     |_grid| { /* redraw */ },
//! )
//! .unwrap();
//!
//! assert_eq!(outcome.report().unwrap().path_length, 5);
//! ```

pub mod find;
pub mod grid;
pub mod heuristic;
pub mod strategy;
pub mod trace;
pub mod util;

pub use find::{
    search, search_with_cancel, Algorithm, CancelToken, PathFinder, PathFinderState,
    SearchOutcome, SearchSummary,
};
pub use grid::{Cell, CellMap, Grid, GridError, Position, Role, Visitation};
pub use heuristic::{manhattan, Heuristic};
pub use strategy::{
    AStar, BreadthFirst, DepthFirst, Dijkstra, PriorityFrontier, SearchTree, Strategy,
};
pub use trace::{reconstruct, PathReport, PathTracer};
