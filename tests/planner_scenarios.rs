//! End-to-end planning requests on small grids.

mod common;

use std::thread;

use common::*;
use marga::{
    DetourMode, Endpoint, Lifecycle, Planner, PlannerConfig, PlannerError, Scenario, SolverState,
    WorldPoint,
};

fn plan_block(detour: DetourMode) -> marga::Plan {
    let mut config = scenario_config();
    config.solver.detour = detour;
    let mut planner = active_planner(config);
    planner.set_cost_grid(block_grid());
    planner.set_path(straight_route());
    planner.create_plan(start(), goal()).expect("plan")
}

#[test]
fn test_block_without_side_preference() {
    let plan = plan_block(DetourMode::Ignore);

    assert_eq!(plan.obstacle_count, 4);
    assert_eq!(plan.group_count, 1);
    assert_eq!(plan.report.state, SolverState::Converged);
    assert_eq!(plan.route.len(), 10);

    // Nodes beside the block end up one influence radius clear of its cell
    // centres, above its top edge
    for i in [4, 5] {
        assert!(plan.route.waypoints[i].y > 6.0, "{:?}", plan.route.waypoints[i]);
    }

    let tolerance = 1e-3 / 0.5;
    assert!(min_interior_clearance(&plan.route, &block_centres()) >= 1.5 - tolerance - 0.01);
}

#[test]
fn test_endpoints_unchanged() {
    for detour in [DetourMode::Ignore, DetourMode::Left, DetourMode::Right] {
        let plan = plan_block(detour);
        assert_eq!(plan.route.first(), Some(&start()));
        assert_eq!(plan.route.last(), Some(&goal()));
    }
}

#[test]
fn test_left_and_right_pass_on_opposite_sides() {
    let left = plan_block(DetourMode::Left);
    let right = plan_block(DetourMode::Right);

    for i in [4, 5] {
        assert!(left.route.waypoints[i].y - 5.0 > 1.0);
        assert!(right.route.waypoints[i].y - 5.0 < -1.0);
    }
    // Right detour clears the lower edge of the block
    assert!(right.route.waypoints[4].y < 4.0 - 0.5);
    assert!(min_interior_clearance(&right.route, &block_centres()) >= 1.48);
}

#[test]
fn test_output_clear_of_lethal_cells() {
    let mut resampled = scenario_config();
    resampled.path.normalize_output = true;
    resampled.path.normalize_spacing = 0.1;

    // Library defaults assume finer cells than these; the radius floor applies
    let mut defaults = PlannerConfig::default();
    defaults.grid.cost_threshold = 200;

    let cases = [
        (resampled.clone(), DetourMode::Ignore),
        (resampled.clone(), DetourMode::Left),
        (resampled, DetourMode::Right),
        (defaults.clone(), DetourMode::Left),
        (defaults, DetourMode::Right),
    ];
    for (mut config, detour) in cases {
        config.solver.detour = detour;
        let mut planner = active_planner(config);
        planner.set_cost_grid(block_grid());
        planner.set_path(straight_route());

        let plan = planner.create_plan(start(), goal()).expect("plan");
        assert_eq!(plan.report.state, SolverState::Converged, "{}", detour);
        assert!(plan.route.len() > 90);
        let inside = lethal_waypoints(&plan.route, &block_grid());
        assert!(inside.is_empty(), "{}: {:?}", detour, inside);
    }
}

#[test]
fn test_start_outside_grid() {
    let mut planner = active_planner(scenario_config());
    planner.set_cost_grid(block_grid());
    planner.set_path(straight_route());

    let outside = WorldPoint::new(-1.0, 5.0);
    match planner.create_plan(outside, goal()) {
        Err(PlannerError::OutOfBounds { endpoint, point }) => {
            assert_eq!(endpoint, Endpoint::Start);
            assert_eq!(point, outside);
        }
        other => panic!("expected OutOfBounds, got {:?}", other),
    }
    assert!(planner.get_plan(false, 0.0).is_empty());
}

#[test]
fn test_normalized_output_spacing() {
    let mut config = scenario_config();
    config.path.normalize_output = true;
    config.path.normalize_spacing = 0.25;
    let mut planner = active_planner(config);
    planner.set_cost_grid(block_grid());
    planner.set_path(straight_route());

    let plan = planner.create_plan(start(), goal()).expect("plan");
    let gaps: Vec<f32> = plan
        .route
        .waypoints
        .windows(2)
        .map(|w| w[0].distance(&w[1]))
        .collect();
    let (last_gap, inner) = gaps.split_last().expect("gaps");
    for gap in inner {
        assert!(*gap <= 0.25 + 1e-4);
    }
    assert!(*last_gap <= 0.25 + 1e-4);
    assert_eq!(plan.route.last(), Some(&goal()));

    // The debug accessor gives the same route without replanning
    assert_eq!(planner.get_plan(true, 0.25), plan.route);
    assert_eq!(planner.get_plan(false, 0.0).len(), 10);
}

#[test]
fn test_lifecycle_and_mailboxes() {
    init_logging();
    let mut planner = Planner::new(scenario_config()).expect("planner");
    assert!(matches!(planner.activate(), Err(PlannerError::InvalidState { .. })));

    planner.configure().expect("configure");
    let routes = planner.route_mailbox();
    let grids = planner.grid_mailbox();
    thread::spawn(move || {
        assert!(grids.publish(block_grid()));
        assert!(routes.publish(straight_route()));
    })
    .join()
    .expect("producer thread");

    assert!(matches!(
        planner.create_plan(start(), goal()),
        Err(PlannerError::InvalidState { .. })
    ));

    planner.activate().expect("activate");
    assert!(planner.create_plan(start(), goal()).is_ok());

    planner.deactivate().expect("deactivate");
    planner.cleanup().expect("cleanup");
    assert_eq!(planner.lifecycle(), Lifecycle::Unconfigured);
    assert!(!planner.set_cost_grid(block_grid()));
    assert!(!planner.route_mailbox().has_value());

    // Reconfiguring reopens the inputs
    planner.configure().expect("configure again");
    assert!(planner.set_path(straight_route()));
}

#[test]
fn test_grid_resize_between_requests() {
    let mut planner = active_planner(scenario_config());
    planner.set_cost_grid(block_grid());
    planner.set_path(straight_route());
    planner.create_plan(start(), goal()).expect("first plan");

    let wide = marga::GridGeometry::new(20, 10, WorldPoint::ZERO, 1.0);
    let mut grid = marga::CostGrid::filled(wide, marga::costs::FREE).expect("grid");
    grid.fill_rect(14, 4, 15, 5, marga::costs::LETHAL);
    planner.set_cost_grid(grid);
    planner.set_path(marga::Route::new(vec![start(), WorldPoint::new(19.0, 5.0)]));

    let plan = planner
        .create_plan(start(), WorldPoint::new(19.0, 5.0))
        .expect("second plan");
    assert_eq!(planner.grid_index().map(|i| i.width()), Some(20));
    assert_eq!(plan.obstacle_count, 4);
    assert_eq!(plan.route.len(), 20);
    // The detour peaks at the new block; the old block at x = 4 no longer matters
    assert!(plan.route.waypoints[14].y - 5.0 > 1.3);
    assert!(plan.route.waypoints[4].y - 5.0 < 0.6);
}

#[test]
fn test_demo_scenarios_replay() {
    init_logging();
    let config = PlannerConfig::load(&demo_path("marga.toml")).expect("demo config");

    for (file, side) in [("block_on_route.yaml", 1.0f32), ("single_post_right.yaml", -1.0)] {
        let scenario = Scenario::load(&demo_path(&format!("scenarios/{}", file))).expect("scenario");
        let mut config = config.clone();
        if let Some(detour) = scenario.detour {
            config.solver.detour = detour;
        }

        let mut planner = Planner::new(config).expect("planner");
        planner.configure().expect("configure");
        planner.activate().expect("activate");
        planner.set_cost_grid(scenario.cost_grid().expect("grid"));
        planner.set_path(scenario.reference_route());

        let plan = planner.create_plan(scenario.start, scenario.goal).expect("plan");
        assert_eq!(plan.report.state, SolverState::Converged, "{}", file);
        assert_eq!(plan.route.first(), Some(&scenario.start));
        assert_eq!(plan.route.last(), Some(&scenario.goal));

        let peak = plan
            .route
            .waypoints
            .iter()
            .map(|p| (p.y - 5.0) * side)
            .fold(f32::MIN, f32::max);
        assert!(peak > 0.5, "{}: detour peak {}", file, peak);

        let grid = scenario.cost_grid().expect("grid");
        assert!(lethal_waypoints(&plan.route, &grid).is_empty(), "{}", file);
    }
}
