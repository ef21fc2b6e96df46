//! Frontier strategies, one per search algorithm.
//!
//! The expansion loop itself lives in [`crate::find::PathFinder`]; a strategy
//! only decides which cell comes out of the frontier next and what happens to
//! the neighbors of the cell being expanded.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
};

use crate::grid::{CellMap, Grid, Position, Visitation};
use crate::heuristic::{manhattan, Heuristic};

/// Predecessor links discovered during a single run.
#[derive(Clone, Debug)]
pub struct SearchTree {
    links: CellMap<Option<Position>>,
    len: usize,
}

impl SearchTree {
    pub fn new(grid: &Grid) -> Self {
        Self {
            links: grid.create_storage(None),
            len: 0,
        }
    }

    /// Record that `to` was reached from `from`, replacing any earlier link.
    pub fn link(&mut self, to: Position, from: Position) {
        let slot = self.links.get_mut(to);
        if slot.is_none() {
            self.len += 1;
        }
        *slot = Some(from);
    }

    pub fn predecessor(&self, pos: Position) -> Option<Position> {
        *self.links.get(pos)
    }

    /// Number of positions that have a predecessor.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub trait Strategy {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Reset the frontier so that it only holds `start`.
    fn seed(&mut self, grid: &Grid, start: Position, goal: Position);

    /// Remove the next cell to expand.
    fn next(&mut self) -> Option<Position>;

    /// Look at the neighbors of `current`, push the ones worth visiting and
    /// record how they were reached in `tree`.
    fn expand(&mut self, grid: &mut Grid, current: Position, tree: &mut SearchTree);
}

/// The objects that we store in the priority queue
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct ToVisit {
    priority: usize,
    // insertion counter, earlier entries win ties
    order: u64,
    position: Position,
}

impl Ord for ToVisit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.order.cmp(&other.order))
            .reverse() // reverse for BinaryHeap to be a min-heap
    }
}

impl PartialOrd for ToVisit {
    fn partial_cmp(&self, other: &ToVisit) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first frontier shared by A* and Dijkstra.
///
/// With a heuristic the key is `cost_so_far + estimate` (A*), without one it
/// is `cost_so_far` alone (Dijkstra). When a cheaper route to a queued cell
/// shows up, the cell is queued again under the lower key but with its
/// original insertion order, and the entry it supersedes is dropped when it
/// comes out of the heap. Each cell is handed out at most once per queuing.
#[derive(Debug)]
pub struct PriorityFrontier {
    heuristic: Option<Heuristic>,
    goal: Position,
    open: BinaryHeap<ToVisit>,
    // insertion order of the live entry of each queued cell
    pending: CellMap<Option<u64>>,
    cost_so_far: CellMap<usize>,
    estimated_total: Option<CellMap<usize>>,
    counter: u64,
}

impl PriorityFrontier {
    fn new(heuristic: Option<Heuristic>) -> Self {
        Self {
            heuristic,
            goal: Position::new(0, 0),
            open: BinaryHeap::new(),
            pending: CellMap::default(),
            cost_so_far: CellMap::default(),
            estimated_total: None,
            counter: 0,
        }
    }

    /// Cost of the best known route to `pos`, `None` if it was never reached.
    pub fn cost_so_far(&self, pos: Position) -> Option<usize> {
        Some(*self.cost_so_far.get(pos)).filter(|c| *c != usize::MAX)
    }

    /// `cost_so_far + estimate` for `pos`; always `None` without a heuristic.
    pub fn estimated_total(&self, pos: Position) -> Option<usize> {
        self.estimated_total
            .as_ref()
            .map(|m| *m.get(pos))
            .filter(|c| *c != usize::MAX)
    }

    fn seed(&mut self, grid: &Grid, start: Position, goal: Position) {
        self.goal = goal;
        self.open.clear();
        self.counter = 0;
        self.pending = grid.create_storage(None);
        self.cost_so_far = grid.create_storage(usize::MAX);

        *self.cost_so_far.get_mut(start) = 0;
        if let Some(h) = self.heuristic {
            let mut estimated = grid.create_storage(usize::MAX);
            *estimated.get_mut(start) = h(start, goal);
            self.estimated_total = Some(estimated);
        } else {
            self.estimated_total = None;
        }

        self.open.push(ToVisit {
            priority: 0,
            order: self.counter,
            position: start,
        });
        *self.pending.get_mut(start) = Some(self.counter);
    }

    fn next(&mut self) -> Option<Position> {
        while let Some(visit) = self.open.pop() {
            let live = self.pending.get_mut(visit.position);
            if *live == Some(visit.order) {
                *live = None;
                return Some(visit.position);
            }
        }
        None
    }

    fn expand(&mut self, grid: &mut Grid, current: Position, tree: &mut SearchTree) {
        let tentative = *self.cost_so_far.get(current) + 1;
        let neighbors: Vec<Position> = grid.neighbors_of(current).collect();

        for neighbor in neighbors {
            if tentative >= *self.cost_so_far.get(neighbor) {
                continue;
            }

            tree.link(neighbor, current);
            *self.cost_so_far.get_mut(neighbor) = tentative;

            let priority = match (self.heuristic, self.estimated_total.as_mut()) {
                (Some(h), Some(estimated)) => {
                    let f = tentative + h(neighbor, self.goal);
                    *estimated.get_mut(neighbor) = f;
                    f
                }
                _ => tentative,
            };

            if self.pending.get(neighbor).is_some() {
                self.reprioritize(neighbor, priority);
                continue;
            }

            self.counter += 1;
            self.open.push(ToVisit {
                priority,
                order: self.counter,
                position: neighbor,
            });
            *self.pending.get_mut(neighbor) = Some(self.counter);
            grid.mark(neighbor, Visitation::Frontier);
        }
    }

    /// Lower the key of a queued cell. It keeps its insertion order, so ties
    /// still go to whoever was queued first.
    fn reprioritize(&mut self, position: Position, priority: usize) {
        if let Some(order) = *self.pending.get(position) {
            self.open.push(ToVisit {
                priority,
                order,
                position,
            });
        }
    }
}

/// A* ordered by `cost_so_far + heuristic`.
#[derive(Debug)]
pub struct AStar(PriorityFrontier);

impl AStar {
    pub fn new(heuristic: Heuristic) -> Self {
        Self(PriorityFrontier::new(Some(heuristic)))
    }

    pub fn frontier(&self) -> &PriorityFrontier {
        &self.0
    }
}

impl Default for AStar {
    fn default() -> Self {
        Self::new(manhattan)
    }
}

impl Strategy for AStar {
    fn name(&self) -> &'static str {
        "A*"
    }

    fn seed(&mut self, grid: &Grid, start: Position, goal: Position) {
        self.0.seed(grid, start, goal);
    }

    fn next(&mut self) -> Option<Position> {
        self.0.next()
    }

    fn expand(&mut self, grid: &mut Grid, current: Position, tree: &mut SearchTree) {
        self.0.expand(grid, current, tree);
    }
}

/// Dijkstra ordered by `cost_so_far` only.
#[derive(Debug)]
pub struct Dijkstra(PriorityFrontier);

impl Dijkstra {
    pub fn new() -> Self {
        Self(PriorityFrontier::new(None))
    }

    pub fn frontier(&self) -> &PriorityFrontier {
        &self.0
    }
}

impl Default for Dijkstra {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for Dijkstra {
    fn name(&self) -> &'static str {
        "Dijkstra"
    }

    fn seed(&mut self, grid: &Grid, start: Position, goal: Position) {
        self.0.seed(grid, start, goal);
    }

    fn next(&mut self) -> Option<Position> {
        self.0.next()
    }

    fn expand(&mut self, grid: &mut Grid, current: Position, tree: &mut SearchTree) {
        self.0.expand(grid, current, tree);
    }
}

/// FIFO frontier. Cells count as discovered the moment they are queued, so
/// no cell is ever queued twice.
#[derive(Debug, Default)]
pub struct BreadthFirst {
    queue: VecDeque<Position>,
    discovered: CellMap<bool>,
}

impl BreadthFirst {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BreadthFirst {
    fn name(&self) -> &'static str {
        "BFS"
    }

    fn seed(&mut self, grid: &Grid, start: Position, _goal: Position) {
        self.discovered = grid.create_storage(false);
        *self.discovered.get_mut(start) = true;
        self.queue.clear();
        self.queue.push_back(start);
    }

    fn next(&mut self) -> Option<Position> {
        self.queue.pop_front()
    }

    fn expand(&mut self, grid: &mut Grid, current: Position, tree: &mut SearchTree) {
        let neighbors: Vec<Position> = grid.neighbors_of(current).collect();

        for neighbor in neighbors {
            if *self.discovered.get(neighbor) {
                continue;
            }
            *self.discovered.get_mut(neighbor) = true;
            tree.link(neighbor, current);
            self.queue.push_back(neighbor);
            grid.mark(neighbor, Visitation::Frontier);
        }
    }
}

/// LIFO frontier. A cell is only marked visited when it is popped, so it may
/// sit on the stack several times; every push overwrites its predecessor.
#[derive(Debug, Default)]
pub struct DepthFirst {
    stack: Vec<Position>,
    visited: CellMap<bool>,
}

impl DepthFirst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries currently on the stack, duplicates included.
    pub fn pending(&self) -> usize {
        self.stack.len()
    }
}

impl Strategy for DepthFirst {
    fn name(&self) -> &'static str {
        "DFS"
    }

    fn seed(&mut self, grid: &Grid, start: Position, _goal: Position) {
        self.visited = grid.create_storage(false);
        self.stack.clear();
        self.stack.push(start);
    }

    fn next(&mut self) -> Option<Position> {
        self.stack.pop()
    }

    fn expand(&mut self, grid: &mut Grid, current: Position, tree: &mut SearchTree) {
        if *self.visited.get(current) {
            return;
        }
        *self.visited.get_mut(current) = true;

        let neighbors: Vec<Position> = grid.neighbors_of(current).collect();
        for neighbor in neighbors {
            if *self.visited.get(neighbor) {
                continue;
            }
            tree.link(neighbor, current);
            self.stack.push(neighbor);
            grid.mark(neighbor, Visitation::Frontier);
        }
    }
}
