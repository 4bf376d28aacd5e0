//! # grid_replan
//!
//! Pathfinding for an agent on a 4-connected grid whose obstacles change at runtime. Provides
//! a one-shot [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) planner, an incremental
//! [D* Lite](http://idm-lab.org/bib/abstracts/papers/aaai02b.pdf) planner that repairs its
//! previous search when cells change, and a [HybridController] that starts out with A* and
//! switches to D* Lite for good once the grid is seen to change. Moves are axis-aligned with
//! uniform cost.
//!
//! Paths never include the start cell and end on the goal. An empty path means there is
//! nothing to walk: the request was invalid, the goal is unreachable or already reached.
mod astar_search;
pub mod config;
pub mod error;
pub mod grid_map;
pub mod hybrid;
pub mod priority_queue;
pub mod solver;

pub use config::{GridConfig, HybridConfig};
pub use error::{ConfigError, PlanError};
pub use grid_map::GridMap;
pub use grid_util::point::Point;
pub use hybrid::{HybridController, PlannerMode};
pub use priority_queue::PriorityQueue;
pub use solver::{
    astar::AStarPlanner,
    dstar_lite::{IncrementalPlanner, Key},
    euclidean_distance, is_valid_path, path_cost, GridPlanner,
};

/// Cost of a single axis-aligned move.
pub const STEP_COST: f64 = 1.0;
