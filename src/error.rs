//! Error types for planning requests and configuration.

use grid_util::point::Point;
use thiserror::Error;

/// Why a planning request produced no (complete) path.
///
/// [GridPlanner::find_path](crate::solver::GridPlanner::find_path) folds all of these into the
/// empty-path result; [try_find_path](crate::solver::GridPlanner::try_find_path) exposes them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("cell {0} lies outside the grid")]
    OutOfBounds(Point),

    #[error("start {0} is not walkable")]
    StartBlocked(Point),

    #[error("goal {0} is not walkable")]
    GoalBlocked(Point),

    #[error("no traversable route from {start} to {goal}")]
    Unreachable { start: Point, goal: Point },

    #[error("path reconstruction stalled at {at} after {} steps", .partial.len())]
    StaleReconstruction { at: Point, partial: Vec<Point> },
}

impl PlanError {
    /// True for malformed requests, as opposed to search outcomes.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            PlanError::OutOfBounds(_) | PlanError::StartBlocked(_) | PlanError::GoalBlocked(_)
        )
    }
}

/// Rejected grid or controller configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("obstruction probability {0} is outside [0, 1]")]
    ObstructionProbability(f64),
}
