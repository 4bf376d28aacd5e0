use crate::{error::PlanError, grid_map::GridMap, STEP_COST};
use grid_util::point::Point;
use itertools::Itertools;
use log::{debug, warn};

pub mod astar;
pub mod dstar_lite;

/// Straight-line distance between two cells. Never exceeds the number of 4-connected unit steps
/// between them, so it is admissible for both planners.
pub fn euclidean_distance(p1: &Point, p2: &Point) -> f64 {
    let dx = (p1.x - p2.x) as f64;
    let dy = (p1.y - p2.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Sum of step costs along a path. A path that starts next to the agent costs its length.
pub fn path_cost(path: &[Point]) -> f64 {
    path.len() as f64 * STEP_COST
}

/// Checks that a planned path leaves `start` one 4-connected step at a time over walkable
/// cells and ends on `goal`. The empty path is valid exactly when `start == goal`.
pub fn is_valid_path(grid: &GridMap, start: Point, goal: Point, path: &[Point]) -> bool {
    match path.last() {
        None => start == goal,
        Some(last) => {
            *last == goal
                && path.iter().all(|p| grid.is_walkable(*p))
                && std::iter::once(&start)
                    .chain(path.iter())
                    .tuple_windows()
                    .all(|(a, b)| a.manhattan_distance(b) == 1)
        }
    }
}

/// Rejects requests that can never succeed before any search state is touched.
pub fn validate_request(grid: &GridMap, start: Point, goal: Point) -> Result<(), PlanError> {
    for p in [start, goal] {
        if !grid.is_in_bounds(p) {
            return Err(PlanError::OutOfBounds(p));
        }
    }
    if !grid.is_walkable(goal) {
        return Err(PlanError::GoalBlocked(goal));
    }
    if !grid.is_walkable(start) {
        return Err(PlanError::StartBlocked(start));
    }
    Ok(())
}

/// A planner answering single path requests on a [GridMap]. Paths exclude the start cell and
/// end on the goal; planners synchronize internally so requests only need `&self`.
pub trait GridPlanner {
    fn name(&self) -> &'static str;

    /// Computes a path and reports why none could be produced.
    fn try_find_path(&self, grid: &GridMap, start: Point, goal: Point)
        -> Result<Vec<Point>, PlanError>;

    /// Computes a path from start to goal. An empty result means that there is nothing to
    /// walk, whether the request was invalid, the goal unreachable or already reached. A
    /// reconstruction that stalls yields the part of the path built so far.
    fn find_path(&self, grid: &GridMap, start: Point, goal: Point) -> Vec<Point> {
        match self.try_find_path(grid, start, goal) {
            Ok(path) => path,
            Err(PlanError::StaleReconstruction { at, partial }) => {
                warn!(
                    "{}: path reconstruction from {} to {} stalled at {}",
                    self.name(),
                    start,
                    goal,
                    at
                );
                partial
            }
            Err(e) => {
                debug!("{}: no path from {} to {}: {}", self.name(), start, goal, e);
                Vec::new()
            }
        }
    }
}
