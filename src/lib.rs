//! # Marga: Path Repair Around Newly Observed Obstacles
//!
//! Takes a reference route and a live cost grid and bends the route around
//! obstacles that were not there when it was planned, keeping its overall
//! shape and, optionally, passing every obstacle on a chosen side.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use marga::{CostGrid, GridGeometry, Planner, PlannerConfig, Route, WorldPoint};
//!
//! let mut planner = Planner::new(PlannerConfig::default()).unwrap();
//! planner.configure().unwrap();
//! planner.activate().unwrap();
//!
//! let geometry = GridGeometry::new(200, 200, WorldPoint::ZERO, 0.05);
//! let mut grid = CostGrid::filled(geometry, 0).unwrap();
//! grid.fill_rect(90, 95, 110, 105, 255);
//! planner.set_cost_grid(grid);
//! planner.set_path(Route::new(vec![WorldPoint::new(1.0, 5.0), WorldPoint::new(9.0, 5.0)]));
//!
//! let plan = planner
//!     .create_plan(WorldPoint::new(1.0, 5.0), WorldPoint::new(9.0, 5.0))
//!     .unwrap();
//! println!("{} waypoints, {:?}", plan.route.len(), plan.report.state);
//! ```
//!
//! ## Pipeline
//!
//! 1. [`grid`]: world ↔ cell conversion, cost snapshot, mark buffer
//! 2. [`obstacles`]: threshold scan, flood-fill grouping, spatial index
//! 3. [`path`]: node seeding and arc-length resampling
//! 4. [`relax`]: bounded force-based relaxation of the nodes
//! 5. [`planner`]: lifecycle, input mailboxes, request orchestration
//!
//! ## Coordinate Frame
//!
//! World coordinates are in the grid's frame. Grid cell (x, y) covers the
//! square whose lower-left corner is `origin + (x, y) * resolution`. Cells are
//! stored row-major, and an obstacle cell is represented by its centre.
//! "Left" of a path is the counter-clockwise side of its
//! direction of travel.

pub mod config;
pub mod core;
pub mod error;
pub mod grid;
pub mod obstacles;
pub mod path;
pub mod planner;
pub mod relax;
pub mod scenario;

pub use config::{Connectivity, DetourMode, IndexBackend, PlannerConfig, SolverConfig};
pub use crate::core::{GridCoord, WorldPoint};
pub use error::{Endpoint, PlannerError, Result};
pub use grid::{costs, CostGrid, GridGeometry, GridIndex, MarkBuffer};
pub use obstacles::{Obstacle, ObstacleExtractor, ObstacleGroup, ObstacleMap};
pub use path::{Route, WorkingPath};
pub use planner::{DebugSink, Lifecycle, LogSink, Mailbox, NullSink, Plan, Planner};
pub use relax::{RelaxationSolver, SolverReport, SolverState};
pub use scenario::Scenario;
