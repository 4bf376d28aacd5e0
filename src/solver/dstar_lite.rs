//! [D* Lite](http://idm-lab.org/bib/abstracts/papers/aaai02b.pdf) keeps its search tree rooted
//! at the goal between requests. Cells whose walkability changed are reported through
//! [IncrementalPlanner::mark_cell_changed] and only the affected region is repaired on the next
//! request.
use fxhash::{FxBuildHasher, FxHashMap, FxHashSet};
use grid_util::point::Point;
use indexmap::IndexSet;
use log::{debug, info};
use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    error::PlanError,
    grid_map::GridMap,
    priority_queue::PriorityQueue,
    solver::{euclidean_distance, validate_request, GridPlanner},
    STEP_COST,
};

const INFINITY: f64 = f64::INFINITY;

/// Priority of a locally inconsistent cell, compared lexicographically on `(k1, k2)`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Key {
    pub k1: f64,
    pub k2: f64,
}

impl Key {
    pub fn new(k1: f64, k2: f64) -> Key {
        Key { k1, k2 }
    }
}

#[derive(Debug, Default)]
struct DStarLiteState {
    g: FxHashMap<Point, f64>,
    rhs: FxHashMap<Point, f64>,
    queue: PriorityQueue<Point, Key>,
    km: f64,
    goal: Option<Point>,
    last_start: Option<Point>,
    pending: IndexSet<Point, FxBuildHasher>,
}

impl DStarLiteState {
    fn g(&self, p: Point) -> f64 {
        self.g.get(&p).copied().unwrap_or(INFINITY)
    }

    fn rhs(&self, p: Point) -> f64 {
        self.rhs.get(&p).copied().unwrap_or(INFINITY)
    }

    fn is_consistent(&self, p: Point) -> bool {
        self.g(p) == self.rhs(p)
    }

    fn calculate_key(&self, p: Point, start: Point) -> Key {
        let m = self.g(p).min(self.rhs(p));
        Key::new(m + euclidean_distance(&p, &start) + self.km, m)
    }

    /// The goal stays enterable even if it is flagged as obstructed.
    fn edge_cost(&self, grid: &GridMap, to: Point) -> f64 {
        if Some(to) == self.goal || grid.is_walkable(to) {
            STEP_COST
        } else {
            INFINITY
        }
    }

    fn initialize(&mut self, goal: Point, start: Point) {
        self.g.clear();
        self.rhs.clear();
        self.queue.clear();
        self.pending.clear();
        self.km = 0.0;
        self.goal = Some(goal);
        self.last_start = Some(start);
        self.rhs.insert(goal, 0.0);
        let key = self.calculate_key(goal, start);
        self.queue.enqueue(goal, key);
    }

    fn update_vertex(&mut self, grid: &GridMap, u: Point, start: Point) {
        if Some(u) != self.goal {
            let rhs = grid
                .neighbors(u)
                .into_iter()
                .map(|s| self.edge_cost(grid, s) + self.g(s))
                .fold(INFINITY, f64::min);
            self.rhs.insert(u, rhs);
        }
        self.queue.remove(&u);
        if !self.is_consistent(u) {
            let key = self.calculate_key(u, start);
            self.queue.enqueue(u, key);
        }
    }

    /// A walkability change alters every edge entering the cell, so the rhs of the cell and of
    /// each neighbour (whose successor it is) has to be recomputed.
    fn apply_changes(&mut self, grid: &GridMap, start: Point) {
        if self.pending.is_empty() {
            return;
        }
        let changed = std::mem::take(&mut self.pending);
        debug!("D* Lite: applying {} changed cells", changed.len());
        for cell in changed {
            if !grid.is_in_bounds(cell) {
                continue;
            }
            self.update_vertex(grid, cell, start);
            for n in grid.neighbors(cell) {
                self.update_vertex(grid, n, start);
            }
        }
    }

    fn compute_shortest_path(&mut self, grid: &GridMap, start: Point) {
        while let Some(k_old) = self.queue.peek_key() {
            if !(k_old < self.calculate_key(start, start)) && self.is_consistent(start) {
                break;
            }
            let u = match self.queue.dequeue() {
                Some(u) => u,
                None => break,
            };
            let k_new = self.calculate_key(u, start);
            if k_old < k_new {
                // Queued before the start moved; its key only grew since.
                self.queue.enqueue(u, k_new);
                continue;
            }
            let (g, rhs) = (self.g(u), self.rhs(u));
            if g > rhs {
                self.g.insert(u, rhs);
            } else {
                self.g.insert(u, INFINITY);
                self.update_vertex(grid, u, start);
            }
            for p in grid.neighbors(u) {
                self.update_vertex(grid, p, start);
            }
        }
    }

    /// Walks greedily from the start towards the neighbour minimizing `edge cost + g`. Gives up
    /// on dead ends or revisits, which only stale g-values can produce.
    fn reconstruct(
        &self,
        grid: &GridMap,
        start: Point,
        goal: Point,
    ) -> Result<Vec<Point>, PlanError> {
        let mut path = Vec::new();
        let mut visited = FxHashSet::default();
        visited.insert(start);
        let mut current = start;
        for _ in 0..grid.len() {
            if current == goal {
                return Ok(path);
            }
            let next = grid
                .neighbors(current)
                .into_iter()
                .map(|s| (s, self.edge_cost(grid, s) + self.g(s)))
                .filter(|(_, cost)| cost.is_finite())
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            match next {
                Some((s, _)) if visited.insert(s) => {
                    path.push(s);
                    current = s;
                }
                _ => break,
            }
        }
        if current == goal {
            Ok(path)
        } else {
            Err(PlanError::StaleReconstruction {
                at: current,
                partial: path,
            })
        }
    }
}

/// Incremental planner for a fixed goal on a changing grid. All state sits behind one mutex, so
/// [mark_cell_changed](Self::mark_cell_changed) can be called from another thread while a
/// request is in flight; the change is picked up by the next request.
#[derive(Debug, Default)]
pub struct IncrementalPlanner {
    state: Mutex<DStarLiteState>,
}

impl IncrementalPlanner {
    pub fn new() -> IncrementalPlanner {
        IncrementalPlanner::default()
    }

    fn lock(&self) -> MutexGuard<'_, DStarLiteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a cell whose walkability changed. Applied at the start of the next request.
    pub fn mark_cell_changed(&self, cell: Point) {
        self.lock().pending.insert(cell);
    }

    pub fn pending_changes(&self) -> usize {
        self.lock().pending.len()
    }

    /// The goal the persisted search tree is rooted at.
    pub fn goal(&self) -> Option<Point> {
        self.lock().goal
    }

    pub fn km(&self) -> f64 {
        self.lock().km
    }

    pub fn g_value(&self, cell: Point) -> f64 {
        self.lock().g(cell)
    }

    pub fn rhs_value(&self, cell: Point) -> f64 {
        self.lock().rhs(cell)
    }

    /// Number of locally inconsistent cells waiting in the frontier.
    pub fn frontier_len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Drops all persisted state; the next request initializes from scratch.
    pub fn reset(&self) {
        *self.lock() = DStarLiteState::default();
    }
}

impl GridPlanner for IncrementalPlanner {
    fn name(&self) -> &'static str {
        "D* Lite"
    }

    fn try_find_path(
        &self,
        grid: &GridMap,
        start: Point,
        goal: Point,
    ) -> Result<Vec<Point>, PlanError> {
        validate_request(grid, start, goal)?;
        if start == goal {
            return Ok(Vec::new());
        }
        let mut state = self.lock();
        if state.goal != Some(goal) {
            info!("D* Lite: initializing search towards {}", goal);
            state.initialize(goal, start);
        } else {
            if let Some(last_start) = state.last_start {
                state.km += euclidean_distance(&last_start, &start);
            }
            state.last_start = Some(start);
            state.apply_changes(grid, start);
        }
        state.compute_shortest_path(grid, start);
        if state.g(start).is_infinite() {
            return Err(PlanError::Unreachable { start, goal });
        }
        state.reconstruct(grid, start, goal)
    }
}
