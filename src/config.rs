//! Configuration loading for marga
//!
//! All parameters load from a single TOML file; every field has a default so
//! an empty file (or [`PlannerConfig::default`]) is a valid configuration.
//!
//! ```toml
//! [grid]
//! cost_threshold = 254
//! connectivity = "eight"
//!
//! [solver]
//! detour = "left"
//! influence_radius = 0.5
//! max_iterations = 500
//!
//! [path]
//! normalize_output = true
//! normalize_spacing = 0.1
//!
//! [debug]
//! publish_iterations = true
//! min_publish_interval_ms = 200
//! ```

use crate::error::{PlannerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Side preference when repairing a route around obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetourMode {
    /// Pass obstacles keeping them on the right (nodes pushed left)
    Left,
    /// Pass obstacles keeping them on the left (nodes pushed right)
    Right,
    /// No side preference, radial repulsion only
    #[default]
    Ignore,
}

impl DetourMode {
    /// Sign applied to the left normal of the path: +1 left, -1 right, 0 none.
    #[inline]
    pub fn side_sign(&self) -> f32 {
        match self {
            DetourMode::Left => 1.0,
            DetourMode::Right => -1.0,
            DetourMode::Ignore => 0.0,
        }
    }

    /// Side used to break ties when the radial direction is undefined.
    ///
    /// Ignore falls back to the left side.
    #[inline]
    pub fn fallback_sign(&self) -> f32 {
        match self {
            DetourMode::Right => -1.0,
            _ => 1.0,
        }
    }
}

impl std::fmt::Display for DetourMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetourMode::Left => write!(f, "left"),
            DetourMode::Right => write!(f, "right"),
            DetourMode::Ignore => write!(f, "ignore"),
        }
    }
}

impl FromStr for DetourMode {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(DetourMode::Left),
            "right" => Ok(DetourMode::Right),
            "ignore" | "none" => Ok(DetourMode::Ignore),
            other => Err(PlannerError::InvalidConfiguration(format!(
                "unknown detour mode '{}'",
                other
            ))),
        }
    }
}

/// Neighbourhood used when growing obstacle groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

/// Spatial index backend for obstacle proximity queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// R*-tree (rstar)
    #[default]
    Rtree,
    /// Uniform hash-bucket grid
    Bucket,
}

/// Main configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub grid: GridSection,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub path: PathSection,
    #[serde(default)]
    pub debug: DebugSection,
}

/// Obstacle extraction settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSection {
    /// Minimum cell cost counted as an obstacle (default: 254)
    #[serde(default = "default_cost_threshold")]
    pub cost_threshold: u8,

    /// Flood-fill neighbourhood (default: eight)
    #[serde(default)]
    pub connectivity: Connectivity,

    /// Maximum Chebyshev distance from a seed cell a group may grow to, in cells (default: 100)
    #[serde(default = "default_max_group_radius")]
    pub max_group_radius: u32,

    /// Spatial index used for proximity queries (default: rtree)
    #[serde(default)]
    pub spatial_index: IndexBackend,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            cost_threshold: default_cost_threshold(),
            connectivity: Connectivity::default(),
            max_group_radius: default_max_group_radius(),
            spatial_index: IndexBackend::default(),
        }
    }
}

/// Relaxation solver parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Side preference (default: ignore)
    #[serde(default)]
    pub detour: DetourMode,

    /// Distance within which obstacle cell centres repel nodes, world units (default: 0.5).
    /// Raised to three quarters of a cell on grids too coarse for it.
    #[serde(default = "default_influence_radius")]
    pub influence_radius: f32,

    /// Fraction of the clearance deficit corrected per round (default: 0.5)
    #[serde(default = "default_repulsion_gain")]
    pub repulsion_gain: f32,

    /// Side push relative to the clearance deficit (default: 0.8)
    #[serde(default = "default_lateral_gain")]
    pub lateral_gain: f32,

    /// Fraction of the distance to the neighbour midpoint moved per round (default: 0.4)
    #[serde(default = "default_smoothing_gain")]
    pub smoothing_gain: f32,

    /// Maximum displacement of one node per round, world units (default: 0.05)
    #[serde(default = "default_max_step")]
    pub max_step: f32,

    /// Round is converged when no node moved further than this (default: 0.001)
    #[serde(default = "default_convergence_tolerance")]
    pub convergence_tolerance: f32,

    /// Hard cap on relaxation rounds (default: 500)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Treat hitting the iteration cap as a planning failure (default: false)
    #[serde(default)]
    pub fail_on_incomplete: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            detour: DetourMode::default(),
            influence_radius: default_influence_radius(),
            repulsion_gain: default_repulsion_gain(),
            lateral_gain: default_lateral_gain(),
            smoothing_gain: default_smoothing_gain(),
            max_step: default_max_step(),
            convergence_tolerance: default_convergence_tolerance(),
            max_iterations: default_max_iterations(),
            fail_on_incomplete: false,
        }
    }
}

/// Node seeding and output resampling
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathSection {
    /// Spacing of working nodes along the reference route; grid resolution when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_spacing: Option<f32>,

    /// Resample the output route to a fixed spacing (default: true)
    #[serde(default = "default_true")]
    pub normalize_output: bool,

    /// Output waypoint spacing, world units (default: 0.1)
    #[serde(default = "default_normalize_spacing")]
    pub normalize_spacing: f32,
}

impl Default for PathSection {
    fn default() -> Self {
        Self {
            node_spacing: None,
            normalize_output: true,
            normalize_spacing: default_normalize_spacing(),
        }
    }
}

/// Debug path publication
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DebugSection {
    /// Emit the working path after relaxation rounds (default: false)
    #[serde(default)]
    pub publish_iterations: bool,

    /// Minimum time between two iteration publications (default: 100)
    #[serde(default = "default_min_publish_interval_ms")]
    pub min_publish_interval_ms: u64,

    /// Also solve with left and right detour and emit both candidates (default: false)
    #[serde(default)]
    pub publish_detour_candidates: bool,
}

impl Default for DebugSection {
    fn default() -> Self {
        Self {
            publish_iterations: false,
            min_publish_interval_ms: default_min_publish_interval_ms(),
            publish_detour_candidates: false,
        }
    }
}

// Default value functions
fn default_cost_threshold() -> u8 {
    254
}
fn default_max_group_radius() -> u32 {
    100
}
fn default_influence_radius() -> f32 {
    0.5
}
fn default_repulsion_gain() -> f32 {
    0.5
}
fn default_lateral_gain() -> f32 {
    0.8
}
fn default_smoothing_gain() -> f32 {
    0.4
}
fn default_max_step() -> f32 {
    0.05
}
fn default_convergence_tolerance() -> f32 {
    0.001
}
fn default_max_iterations() -> usize {
    500
}
fn default_true() -> bool {
    true
}
fn default_normalize_spacing() -> f32 {
    0.1
}
fn default_min_publish_interval_ms() -> u64 {
    100
}

fn require_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlannerError::InvalidConfiguration(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

fn require_non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PlannerError::InvalidConfiguration(format!(
            "{} must be non-negative, got {}",
            name, value
        )))
    }
}

impl SolverConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        require_positive("solver.influence_radius", self.influence_radius)?;
        require_positive("solver.repulsion_gain", self.repulsion_gain)?;
        require_non_negative("solver.lateral_gain", self.lateral_gain)?;
        require_non_negative("solver.smoothing_gain", self.smoothing_gain)?;
        if self.smoothing_gain > 1.0 {
            return Err(PlannerError::InvalidConfiguration(format!(
                "solver.smoothing_gain must not exceed 1.0, got {}",
                self.smoothing_gain
            )));
        }
        require_positive("solver.max_step", self.max_step)?;
        require_positive("solver.convergence_tolerance", self.convergence_tolerance)?;
        if self.max_iterations == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "solver.max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlannerError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for out-of-range parameters.
    pub fn validate(&self) -> Result<()> {
        self.solver.validate()?;
        if let Some(spacing) = self.path.node_spacing {
            require_positive("path.node_spacing", spacing)?;
        }
        require_positive("path.normalize_spacing", self.path.normalize_spacing)?;
        if self.grid.max_group_radius == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "grid.max_group_radius must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize back to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PlannerError::Config(e.to_string()))
    }
}
