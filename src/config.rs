//! Constructor parameters for the grid and the hybrid controller.

use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Grid dimensions and random obstruction density.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GridConfig {
    #[serde(default = "default_grid_size")]
    pub width: usize,

    #[serde(default = "default_grid_size")]
    pub height: usize,

    /// Chance that an unprotected cell starts out obstructed.
    #[serde(default = "default_obstruction_probability")]
    pub obstruction_probability: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_size(),
            height: default_grid_size(),
            obstruction_probability: default_obstruction_probability(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if !(0.0..=1.0).contains(&self.obstruction_probability) {
            return Err(ConfigError::ObstructionProbability(
                self.obstruction_probability,
            ));
        }
        Ok(())
    }
}

/// Settings for [HybridController](crate::hybrid::HybridController).
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HybridConfig {
    /// Grace period after construction during which obstruction changes are not tracked.
    #[serde(default = "default_activation_delay")]
    pub activation_delay: Duration,

    /// Log which planner serves each request.
    #[serde(default = "default_log_mode_switching")]
    pub log_mode_switching: bool,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            activation_delay: default_activation_delay(),
            log_mode_switching: default_log_mode_switching(),
        }
    }
}

impl HybridConfig {
    /// A controller that starts tracking obstructions immediately.
    pub fn without_delay() -> Self {
        Self {
            activation_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn default_grid_size() -> usize {
    25
}

fn default_obstruction_probability() -> f64 {
    0.2
}

fn default_activation_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_log_mode_switching() -> bool {
    true
}
