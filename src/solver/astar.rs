use grid_util::point::Point;
use log::warn;
use smallvec::SmallVec;
use std::sync::{Mutex, PoisonError};

use crate::{
    astar_search::SearchContext,
    error::PlanError,
    grid_map::GridMap,
    solver::{euclidean_distance, validate_request, GridPlanner},
    STEP_COST,
};

/// One-shot A* over the current snapshot of the grid. Every request starts from scratch; the
/// search context is kept only to reuse its allocations.
#[derive(Default)]
pub struct AStarPlanner {
    context: Mutex<SearchContext<Point, f64>>,
}

impl AStarPlanner {
    pub fn new() -> AStarPlanner {
        AStarPlanner {
            context: Mutex::new(SearchContext::new()),
        }
    }

    fn successors(grid: &GridMap, node: &Point) -> SmallVec<[(Point, f64); 4]> {
        grid.walkable_neighbors(*node)
            .into_iter()
            .map(|p| (p, STEP_COST))
            .collect()
    }
}

impl GridPlanner for AStarPlanner {
    fn name(&self) -> &'static str {
        "A*"
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
        // Check if start and goal are on the same connected component.
        if grid.unreachable(start, goal) {
            return Err(PlanError::Unreachable { start, goal });
        }
        let mut ct = self.context.lock().unwrap_or_else(PoisonError::into_inner);
        let result = ct.astar(
            &start,
            |node| Self::successors(grid, node),
            |point| euclidean_distance(point, &goal),
            |point| *point == goal,
        );
        match result {
            Some((mut path, _cost)) => {
                path.remove(0);
                Ok(path)
            }
            None => {
                if !grid.components_dirty() {
                    warn!("Reachable goal {} could not be pathed to from {}", goal, start);
                }
                Err(PlanError::Unreachable { start, goal })
            }
        }
    }
}
