use std::{
    fmt::Display,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, GridError, Position, Visitation};
use crate::strategy::{AStar, BreadthFirst, DepthFirst, Dijkstra, SearchTree, Strategy};
use crate::trace::{PathReport, PathTracer};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    AStar,
    Dijkstra,
    BreadthFirst,
    DepthFirst,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::AStar,
        Algorithm::Dijkstra,
        Algorithm::BreadthFirst,
        Algorithm::DepthFirst,
    ];

    /// A fresh frontier strategy for this algorithm. A* uses the Manhattan
    /// distance.
    pub fn strategy(self) -> Box<dyn Strategy> {
        match self {
            Algorithm::AStar => Box::new(AStar::default()),
            Algorithm::Dijkstra => Box::new(Dijkstra::new()),
            Algorithm::BreadthFirst => Box::new(BreadthFirst::new()),
            Algorithm::DepthFirst => Box::new(DepthFirst::new()),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Algorithm::AStar => "astar",
                Algorithm::Dijkstra => "dijkstra",
                Algorithm::BreadthFirst => "bfs",
                Algorithm::DepthFirst => "dfs",
            }
        )
    }
}

impl FromStr for Algorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "astar" | "a*" => Ok(Algorithm::AStar),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "bfs" => Ok(Algorithm::BreadthFirst),
            "dfs" => Ok(Algorithm::DepthFirst),
            _ => Err(anyhow::anyhow!("Invalid algorithm: {}", s)),
        }
    }
}

/// What is left to report when a search ends without a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub cells_visited: usize,
    pub elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SearchOutcome {
    Found(PathReport),
    /// The frontier ran dry without reaching the goal.
    NotFound(SearchSummary),
    /// Stopped through a [`CancelToken`].
    Cancelled(SearchSummary),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn report(&self) -> Option<&PathReport> {
        match self {
            SearchOutcome::Found(report) => Some(report),
            _ => None,
        }
    }

    pub fn cells_visited(&self) -> usize {
        match self {
            SearchOutcome::Found(report) => report.cells_visited,
            SearchOutcome::NotFound(summary) | SearchOutcome::Cancelled(summary) => {
                summary.cells_visited
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            SearchOutcome::Found(report) => report.elapsed,
            SearchOutcome::NotFound(summary) | SearchOutcome::Cancelled(summary) => {
                summary.elapsed
            }
        }
    }
}

/// Shared flag used to ask a running search to stop.
///
/// The search looks at it once per loop iteration, so setting it from inside
/// the `on_step` callback stops the run before the next expansion.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState {
    /// Still expanding the frontier
    Computing,
    /// Goal reached, marking the path
    Tracing,
    NoPathFound,
    Cancelled,
    PathFound(PathReport),
}

impl PathFinderState {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing | PathFinderState::Tracing)
    }
}

/// A single search run over a grid, advanced one step at a time.
///
/// The grid stays mutably borrowed for as long as the run exists, so walls
/// cannot change underneath it. Use [`PathFinder::grid`] to look at the cells
/// between steps.
pub struct PathFinder<'g> {
    grid: &'g mut Grid,
    strategy: Box<dyn Strategy>,
    tree: SearchTree,
    tracer: Option<PathTracer>,
    start: Position,
    goal: Position,
    started: Instant,
    expansions: usize,
    state: PathFinderState,
}

impl<'g> PathFinder<'g> {
    pub fn new(
        grid: &'g mut Grid,
        algorithm: Algorithm,
        start: Position,
        goal: Position,
    ) -> Result<Self, GridError> {
        Self::with_strategy(grid, algorithm.strategy(), start, goal)
    }

    /// Start a run with a custom strategy, e.g. A* with another heuristic.
    pub fn with_strategy(
        grid: &'g mut Grid,
        mut strategy: Box<dyn Strategy>,
        start: Position,
        goal: Position,
    ) -> Result<Self, GridError> {
        grid.cell(start)?;
        grid.cell(goal)?;

        debug!(
            "{} search from {} to {} on a {}x{} grid",
            strategy.name(),
            start,
            goal,
            grid.size(),
            grid.size()
        );

        let started = Instant::now();
        strategy.seed(grid, start, goal);
        let tree = SearchTree::new(grid);

        Ok(Self {
            grid,
            strategy,
            tree,
            tracer: None,
            start,
            goal,
            started,
            expansions: 0,
            state: PathFinderState::Computing,
        })
    }

    /// Run to completion, calling `on_step` after every step that leaves the
    /// search unfinished.
    pub fn finish(mut self, mut on_step: impl FnMut(&Grid), cancel: &CancelToken) -> SearchOutcome {
        loop {
            if cancel.is_cancelled() {
                self.cancel();
            }

            if self.step().is_done() {
                break;
            }

            on_step(&*self.grid);
        }

        self.into_outcome()
    }

    /// Expand one cell, or follow one hop of the path once the goal is
    /// reached. The step after the last hop only settles the report.
    pub fn step(&mut self) -> &PathFinderState {
        match self.state {
            PathFinderState::Computing => self.expand_next(),
            PathFinderState::Tracing => self.trace_next(),
            _ => {}
        }

        &self.state
    }

    fn expand_next(&mut self) {
        let Some(current) = self.strategy.next() else {
            debug!(
                "{} exhausted the frontier after {} expansions",
                self.strategy.name(),
                self.expansions
            );
            self.state = PathFinderState::NoPathFound;
            return;
        };

        if current == self.goal {
            debug!(
                "{} reached {} after {} expansions",
                self.strategy.name(),
                self.goal,
                self.expansions
            );
            self.tracer = Some(PathTracer::new(self.start, self.goal));
            self.trace_next();
            return;
        }

        trace!("expanding {}", current);
        self.strategy.expand(self.grid, current, &mut self.tree);
        if current != self.start {
            self.grid.mark(current, Visitation::Visited);
        }
        self.expansions += 1;
    }

    fn trace_next(&mut self) {
        let Some(tracer) = self.tracer.as_mut() else {
            return;
        };

        if tracer.advance(self.grid, &self.tree) {
            self.state = PathFinderState::Tracing;
            return;
        }

        if let Some(tracer) = self.tracer.take() {
            let report = tracer.into_report(&self.tree, self.started.elapsed());
            debug!(
                "path of {} cells, {} cells visited in {:?}",
                report.path_length, report.cells_visited, report.elapsed
            );
            self.state = PathFinderState::PathFound(report);
        }
    }

    /// Stop the run. Has no effect once it is already done.
    pub fn cancel(&mut self) {
        if !self.state.is_done() {
            debug!("{} cancelled", self.strategy.name());
            self.tracer = None;
            self.state = PathFinderState::Cancelled;
        }
    }

    pub fn state(&self) -> &PathFinderState {
        &self.state
    }

    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    /// The final result, once the run is done.
    pub fn outcome(&self) -> Option<SearchOutcome> {
        match &self.state {
            PathFinderState::Computing | PathFinderState::Tracing => None,
            PathFinderState::PathFound(report) => Some(SearchOutcome::Found(report.clone())),
            PathFinderState::NoPathFound => Some(SearchOutcome::NotFound(self.summary())),
            PathFinderState::Cancelled => Some(SearchOutcome::Cancelled(self.summary())),
        }
    }

    fn into_outcome(self) -> SearchOutcome {
        let summary = self.summary();
        match self.state {
            PathFinderState::PathFound(report) => SearchOutcome::Found(report),
            PathFinderState::NoPathFound => SearchOutcome::NotFound(summary),
            _ => SearchOutcome::Cancelled(summary),
        }
    }

    fn summary(&self) -> SearchSummary {
        SearchSummary {
            cells_visited: self.tree.len() + 1,
            elapsed: self.started.elapsed(),
        }
    }
}

/// Search from `start` to `goal`, calling `on_step` after every step.
///
/// Start and goal must not be walls; this is not checked.
pub fn search(
    grid: &mut Grid,
    algorithm: Algorithm,
    start: Position,
    goal: Position,
    on_step: impl FnMut(&Grid),
) -> Result<SearchOutcome, GridError> {
    search_with_cancel(grid, algorithm, start, goal, on_step, &CancelToken::new())
}

pub fn search_with_cancel(
    grid: &mut Grid,
    algorithm: Algorithm,
    start: Position,
    goal: Position,
    on_step: impl FnMut(&Grid),
    cancel: &CancelToken,
) -> Result<SearchOutcome, GridError> {
    Ok(PathFinder::new(grid, algorithm, start, goal)?.finish(on_step, cancel))
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::heuristic::manhattan;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn bordered(n: usize) -> Grid {
        let mut grid = Grid::new(n).unwrap();
        grid.wall_border();
        grid
    }

    fn on_path(grid: &Grid) -> Vec<Position> {
        grid.cells()
            .filter(|c| c.state() == Visitation::OnPath)
            .map(|c| c.position())
            .collect()
    }

    #[test]
    fn test_basic_route() {
        for algorithm in [
            Algorithm::AStar,
            Algorithm::Dijkstra,
            Algorithm::BreadthFirst,
        ] {
            let mut grid = bordered(5);
            let res = search(&mut grid, algorithm, p(1, 1), p(3, 3), |_| {}).unwrap();

            assert!(
                matches!(
                    res,
                    SearchOutcome::Found(PathReport {
                        path_length: 5,
                        cells_visited: 9,
                        ..
                    })
                ),
                "{} gave {:?}",
                algorithm,
                res
            );
        }
    }

    #[test]
    fn test_dfs_takes_the_long_way() {
        let mut grid = bordered(5);
        let res = search(&mut grid, Algorithm::DepthFirst, p(1, 1), p(3, 3), |_| {}).unwrap();

        let report = res.report().unwrap();
        assert_eq!(report.path_length, 9);
        assert_eq!(report.cells_visited, 9);
        assert_eq!(
            report.path,
            vec![
                p(1, 1),
                p(1, 2),
                p(1, 3),
                p(2, 3),
                p(2, 2),
                p(2, 1),
                p(3, 1),
                p(3, 2),
                p(3, 3),
            ]
        );
    }

    #[test]
    fn test_bfs_trace() {
        let mut grid = bordered(5);
        let mut steps = 0;
        let res = search(&mut grid, Algorithm::BreadthFirst, p(1, 1), p(3, 3), |_| {
            steps += 1
        })
        .unwrap();

        // eight expansions before the goal is popped, four hops back
        assert_eq!(steps, 12);
        assert_eq!(res.report().unwrap().path, vec![p(1, 1), p(2, 1), p(3, 1), p(3, 2), p(3, 3)]);
        assert_eq!(on_path(&grid), vec![p(2, 1), p(3, 1), p(3, 2)]);

        // start and goal keep whatever the search left on them
        assert_eq!(grid.cell(p(1, 1)).unwrap().state(), Visitation::Unvisited);
        assert_eq!(grid.cell(p(3, 3)).unwrap().state(), Visitation::Frontier);
    }

    #[test]
    fn test_astar_path() {
        let mut grid = bordered(5);
        let res = search(&mut grid, Algorithm::AStar, p(1, 1), p(3, 3), |_| {}).unwrap();

        assert_eq!(res.report().unwrap().path, vec![p(1, 1), p(2, 1), p(3, 1), p(3, 2), p(3, 3)]);
    }

    #[test]
    fn test_astar_takes_the_cheaper_route_to_a_queued_cell() {
        // (2, 0) is queued around the right side first, then reached through (1, 0)
        fn detour(pos: Position, _goal: Position) -> usize {
            match (pos.row, pos.col) {
                (1, 0) => 10,
                (2, 0) => 20,
                _ => 0,
            }
        }

        let mut grid = Grid::new(3).unwrap();
        let res = PathFinder::with_strategy(&mut grid, Box::new(AStar::new(detour)), p(0, 0), p(2, 0))
            .unwrap()
            .finish(|_| {}, &CancelToken::new());

        let report = res.report().unwrap();
        assert_eq!(report.path, vec![p(0, 0), p(1, 0), p(2, 0)]);
        assert_eq!(report.cells_visited, 9);
        assert_eq!(on_path(&grid), vec![p(1, 0)]);
    }

    #[test]
    fn test_one_redraw_per_hop() {
        let mut grid = Grid::new(3).unwrap();
        let mut steps = 0;
        let res = search(&mut grid, Algorithm::BreadthFirst, p(0, 0), p(0, 2), |_| {
            steps += 1
        })
        .unwrap();

        let report = res.report().unwrap();
        assert_eq!(report.path_length, 3);
        assert_eq!(report.cells_visited, 8);
        // five expansions, then the hops to (0, 1) and to the start
        assert_eq!(steps, 7);
    }

    #[test]
    fn test_start_is_goal() {
        for algorithm in Algorithm::ALL {
            let mut grid = bordered(5);
            let mut steps = 0;
            let res = search(&mut grid, algorithm, p(2, 2), p(2, 2), |_| steps += 1).unwrap();

            assert_eq!(steps, 0);
            assert!(matches!(
                res,
                SearchOutcome::Found(PathReport {
                    path_length: 1,
                    cells_visited: 1,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_basic_no_route() {
        let mut grid = bordered(5);
        // wall off the goal corner
        grid.set_wall(p(2, 3)).unwrap();
        grid.set_wall(p(3, 2)).unwrap();

        for algorithm in Algorithm::ALL {
            grid.reset_visitation();
            let res = search(&mut grid, algorithm, p(1, 1), p(3, 3), |_| {}).unwrap();

            // 9 interior cells, 2 walls, the goal itself is cut off
            assert!(
                matches!(res, SearchOutcome::NotFound(SearchSummary { cells_visited: 6, .. })),
                "{} gave {:?}",
                algorithm,
                res
            );
            assert!(on_path(&grid).is_empty());
        }
    }

    #[test]
    fn test_cancel_from_callback() {
        let mut grid = Grid::new(10).unwrap();
        let cancel = CancelToken::new();
        let mut steps = 0;

        let res = search_with_cancel(
            &mut grid,
            Algorithm::BreadthFirst,
            p(0, 0),
            p(9, 9),
            |_| {
                steps += 1;
                if steps == 3 {
                    cancel.cancel();
                }
            },
            &cancel,
        )
        .unwrap();

        assert_eq!(steps, 3);
        assert!(matches!(res, SearchOutcome::Cancelled(_)));
    }

    #[test]
    fn test_step_by_step() {
        let mut grid = Grid::new(3).unwrap();
        let mut finder = PathFinder::new(&mut grid, Algorithm::BreadthFirst, p(0, 0), p(0, 2)).unwrap();

        assert_eq!(finder.step(), &PathFinderState::Computing);
        assert_eq!(
            finder.grid().cell(p(1, 0)).unwrap().state(),
            Visitation::Frontier
        );

        while !finder.step().is_done() {}

        assert!(matches!(
            finder.state(),
            PathFinderState::PathFound(PathReport { path_length: 3, .. })
        ));
        assert!(finder.outcome().unwrap().is_found());

        // stepping a finished run changes nothing
        let before = finder.state().clone();
        assert_eq!(finder.step(), &before);
        finder.cancel();
        assert_eq!(finder.state(), &before);
    }

    #[test]
    fn test_cancel_stepwise() {
        let mut grid = Grid::new(4).unwrap();
        let mut finder = PathFinder::new(&mut grid, Algorithm::DepthFirst, p(0, 0), p(3, 3)).unwrap();

        finder.step();
        finder.cancel();

        assert_eq!(finder.step(), &PathFinderState::Cancelled);
        assert!(matches!(
            finder.outcome(),
            Some(SearchOutcome::Cancelled(SearchSummary { cells_visited: 3, .. }))
        ));
    }

    #[test]
    fn test_invalid_endpoints() {
        let mut grid = Grid::new(3).unwrap();

        assert!(matches!(
            search(&mut grid, Algorithm::AStar, p(0, 0), p(3, 0), |_| {}),
            Err(GridError::InvalidPosition { .. })
        ));
        assert!(matches!(
            PathFinder::new(&mut grid, Algorithm::DepthFirst, p(0, 9), p(0, 0)),
            Err(GridError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_custom_heuristic() {
        fn zero(_: Position, _: Position) -> usize {
            0
        }

        let mut grid = bordered(6);
        let finder = PathFinder::with_strategy(
            &mut grid,
            Box::new(AStar::new(zero)),
            p(1, 1),
            p(4, 4),
        )
        .unwrap();
        let res = finder.finish(|_| {}, &CancelToken::new());

        assert_eq!(res.report().unwrap().path_length, manhattan(p(1, 1), p(4, 4)) + 1);
    }

    #[test]
    fn test_algorithm_names() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert!("greedy".parse::<Algorithm>().is_err());
    }
}
