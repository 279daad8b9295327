//! Scenario YAML for replaying planning requests.
//!
//! A scenario describes one request end to end:
//! - Grid geometry and a default cell cost
//! - Rectangular cost blocks painted over the default
//! - Reference route, start and goal
//! - Optional detour override
//!
//! ```yaml
//! name: block_on_route
//! grid:
//!   width: 10
//!   height: 10
//!   resolution: 1.0
//! blocks:
//!   - { min: [4, 4], max: [5, 5], cost: 255 }
//! route:
//!   - { x: 0.0, y: 5.0 }
//!   - { x: 9.0, y: 5.0 }
//! start: { x: 0.0, y: 5.0 }
//! goal: { x: 9.0, y: 5.0 }
//! detour: left
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::DetourMode;
use crate::core::WorldPoint;
use crate::error::Result;
use crate::grid::{costs, CostGrid, GridGeometry};
use crate::path::Route;

/// A planning request loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable scenario name
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub grid: GridSpec,

    /// Cost of every cell not covered by a block (default: 0)
    #[serde(default)]
    pub default_cost: u8,

    /// Blocks painted in order; later blocks overwrite earlier ones
    #[serde(default)]
    pub blocks: Vec<CostBlock>,

    /// Reference route
    pub route: Vec<WorldPoint>,

    pub start: WorldPoint,
    pub goal: WorldPoint,

    /// Overrides the configured detour mode
    #[serde(default)]
    pub detour: Option<DetourMode>,
}

/// Grid geometry in scenario form
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSpec {
    pub width: usize,
    pub height: usize,
    /// World units per cell (default: 0.05)
    #[serde(default = "default_resolution")]
    pub resolution: f32,
    /// World position of the cell (0, 0) corner (default: origin)
    #[serde(default)]
    pub origin: WorldPoint,
}

/// Inclusive rectangle of cells sharing one cost
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CostBlock {
    /// Lower-left cell `[x, y]`
    pub min: [usize; 2],
    /// Upper-right cell `[x, y]`, inclusive
    pub max: [usize; 2],
    /// Cell cost (default: lethal)
    #[serde(default = "default_block_cost")]
    pub cost: u8,
}

fn default_resolution() -> f32 {
    0.05
}

fn default_block_cost() -> u8 {
    costs::LETHAL
}

impl Scenario {
    /// Load a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Parse a scenario from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(
            self.grid.width,
            self.grid.height,
            self.grid.origin,
            self.grid.resolution,
        )
    }

    /// Rasterize the blocks into a cost grid
    pub fn cost_grid(&self) -> Result<CostGrid> {
        let geometry = self.geometry();
        geometry.validate()?;
        let mut grid = CostGrid::filled(geometry, self.default_cost)?;
        for block in &self.blocks {
            grid.fill_rect(block.min[0], block.min[1], block.max[0], block.max[1], block.cost);
        }
        Ok(grid)
    }

    pub fn reference_route(&self) -> Route {
        Route::new(self.route.clone())
    }
}
