//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use marga::{costs, CostGrid, GridGeometry, GridIndex, Planner, PlannerConfig, Route, WorldPoint};

pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Path to a file under `demos/`
pub fn demo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(relative)
}

/// 10x10 grid of 1 m cells
pub fn geometry() -> GridGeometry {
    GridGeometry::new(10, 10, WorldPoint::ZERO, 1.0)
}

/// Free grid with a 2x2 lethal block covering cells (4,4) to (5,5)
pub fn block_grid() -> CostGrid {
    let mut grid = CostGrid::filled(geometry(), costs::FREE).expect("grid");
    grid.fill_rect(4, 4, 5, 5, costs::LETHAL);
    grid
}

/// Block cell centres as extracted obstacle positions
pub fn block_centres() -> Vec<WorldPoint> {
    vec![
        WorldPoint::new(4.5, 4.5),
        WorldPoint::new(5.5, 4.5),
        WorldPoint::new(4.5, 5.5),
        WorldPoint::new(5.5, 5.5),
    ]
}

pub fn start() -> WorldPoint {
    WorldPoint::new(0.0, 5.0)
}

pub fn goal() -> WorldPoint {
    WorldPoint::new(9.0, 5.0)
}

/// Straight route along y = 5
pub fn straight_route() -> Route {
    Route::new(vec![start(), goal()])
}

/// Influence radius 1.5 on 1 m cells, one node per cell, raw output
pub fn scenario_config() -> PlannerConfig {
    let mut config = PlannerConfig::default();
    config.grid.cost_threshold = 200;
    config.solver.influence_radius = 1.5;
    config.solver.max_step = 0.25;
    config.solver.convergence_tolerance = 1e-3;
    config.solver.max_iterations = 500;
    config.path.node_spacing = Some(1.0);
    config.path.normalize_output = false;
    config
}

pub fn active_planner(config: PlannerConfig) -> Planner {
    init_logging();
    let mut planner = Planner::new(config).expect("valid config");
    planner.configure().expect("configure");
    planner.activate().expect("activate");
    planner
}

/// Smallest distance from any interior waypoint to any of `obstacles`
pub fn min_interior_clearance(route: &Route, obstacles: &[WorldPoint]) -> f32 {
    let n = route.len();
    route.waypoints[1..n - 1]
        .iter()
        .flat_map(|p| obstacles.iter().map(move |o| p.distance(o)))
        .fold(f32::MAX, f32::min)
}

/// Waypoint nearest to `x` along the route
pub fn waypoint_near_x(route: &Route, x: f32) -> WorldPoint {
    route
        .waypoints
        .iter()
        .copied()
        .min_by(|a, b| (a.x - x).abs().total_cmp(&(b.x - x).abs()))
        .expect("non-empty route")
}

/// Waypoints that land in a lethal cell of `grid`
pub fn lethal_waypoints(route: &Route, grid: &CostGrid) -> Vec<WorldPoint> {
    let index = GridIndex::new(*grid.geometry()).expect("grid index");
    route
        .waypoints
        .iter()
        .copied()
        .filter(|p| index.index_of_point(p).map(|i| grid.cost(i)) == Some(costs::LETHAL))
        .collect()
}
