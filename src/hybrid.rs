use fxhash::FxHashSet;
use grid_util::point::Point;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    config::HybridConfig,
    grid_map::GridMap,
    solver::{astar::AStarPlanner, dstar_lite::IncrementalPlanner, GridPlanner},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlannerMode {
    /// Every request is planned from scratch with A*.
    OneShot,
    /// Requests go to D* Lite, which repairs its previous search. Terminal.
    Incremental,
}

/// Serves path requests with A* until the grid starts changing, then hands over to D* Lite for
/// good. Once the activation delay has passed, each request diffs the obstructed cells against
/// the previous request and forwards the difference to the incremental planner.
pub struct HybridController {
    config: HybridConfig,
    started_at: Instant,
    mode: PlannerMode,
    tracking: bool,
    last_obstructions: FxHashSet<Point>,
    one_shot: AStarPlanner,
    incremental: Arc<IncrementalPlanner>,
}

impl HybridController {
    pub fn new(grid: &GridMap, config: HybridConfig) -> HybridController {
        HybridController::started_at(grid, config, Instant::now())
    }

    /// Creates a controller whose activation delay counts from `now`.
    pub fn started_at(grid: &GridMap, config: HybridConfig, now: Instant) -> HybridController {
        HybridController {
            config,
            started_at: now,
            mode: PlannerMode::OneShot,
            tracking: false,
            last_obstructions: grid.obstructed_cells(),
            one_shot: AStarPlanner::new(),
            incremental: Arc::new(IncrementalPlanner::new()),
        }
    }

    pub fn mode(&self) -> PlannerMode {
        self.mode
    }

    /// Handle for collaborators that change walkability and report it themselves.
    pub fn incremental(&self) -> Arc<IncrementalPlanner> {
        Arc::clone(&self.incremental)
    }

    pub fn mark_cell_changed(&self, cell: Point) {
        self.incremental.mark_cell_changed(cell);
    }

    /// Whether the activation delay has elapsed at `now`.
    pub fn is_tracking(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.config.activation_delay
    }

    pub fn find_path(&mut self, grid: &GridMap, start: Point, goal: Point) -> Vec<Point> {
        self.find_path_at(grid, start, goal, Instant::now())
    }

    /// Plans a path as of `now`, switching planners first if new obstructions appeared.
    pub fn find_path_at(
        &mut self,
        grid: &GridMap,
        start: Point,
        goal: Point,
        now: Instant,
    ) -> Vec<Point> {
        if self.is_tracking(now) {
            if !self.tracking {
                self.tracking = true;
                if self.config.log_mode_switching {
                    info!(
                        "Incremental planning available after {:?}",
                        self.config.activation_delay
                    );
                }
            }
            self.observe_obstructions(grid);
        }
        let planner = self.planner();
        if self.config.log_mode_switching {
            debug!("Planning {} -> {} with {}", start, goal, planner.name());
        }
        planner.find_path(grid, start, goal)
    }

    fn planner(&self) -> &dyn GridPlanner {
        match self.mode {
            PlannerMode::OneShot => &self.one_shot,
            PlannerMode::Incremental => self.incremental.as_ref(),
        }
    }

    fn observe_obstructions(&mut self, grid: &GridMap) {
        let current = grid.obstructed_cells();
        if self.mode == PlannerMode::OneShot {
            let added = current.difference(&self.last_obstructions).count();
            if added > 0 {
                self.mode = PlannerMode::Incremental;
                if self.config.log_mode_switching {
                    info!(
                        "{} new obstructions detected, switching to incremental planning",
                        added
                    );
                }
            }
        }
        if self.mode == PlannerMode::Incremental {
            for cell in current.symmetric_difference(&self.last_obstructions) {
                self.incremental.mark_cell_changed(*cell);
            }
        }
        self.last_obstructions = current;
    }
}
