//! Request orchestration.

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{DetourMode, PlannerConfig};
use crate::core::WorldPoint;
use crate::error::{Endpoint, PlannerError, Result};
use crate::grid::{CostGrid, GridGeometry, GridIndex, MarkBuffer};
use crate::obstacles::{ObstacleExtractor, ObstacleMap};
use crate::path::{normalize, Route, WorkingPath};
use crate::relax::{RelaxationSolver, SolverReport, SolverState};

use super::debug::{DebugSink, NullSink, RateLimiter};
use super::lifecycle::{Lifecycle, Transition};
use super::mailbox::Mailbox;

/// Result of one planning request.
#[derive(Clone, Debug, Serialize)]
pub struct Plan {
    /// Repaired route, resampled when output normalization is on
    pub route: Route,
    pub report: SolverReport,
    pub detour: DetourMode,
    /// Obstacle cells found in the grid snapshot
    pub obstacle_count: usize,
    pub group_count: usize,
}

/// Path repair planner.
///
/// Route and grid arrive through [`Mailbox`] handles that other threads may
/// publish to at any time; each [`create_plan`](Planner::create_plan) call
/// works on one snapshot of both.
pub struct Planner {
    config: PlannerConfig,
    lifecycle: Lifecycle,
    detour: DetourMode,
    index: Option<GridIndex>,
    marks: MarkBuffer,
    routes: Mailbox<Route>,
    grids: Mailbox<CostGrid>,
    last_path: Option<WorkingPath>,
    sink: Box<dyn DebugSink>,
    limiter: RateLimiter,
}

impl Planner {
    /// Create an unconfigured planner that discards debug output.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        Self::with_sink(config, Box::new(NullSink))
    }

    pub fn with_sink(config: PlannerConfig, sink: Box<dyn DebugSink>) -> Result<Self> {
        config.validate()?;
        let routes = Mailbox::new();
        let grids = Mailbox::new();
        // Inputs are accepted only between configure and cleanup
        routes.close();
        grids.close();

        Ok(Self {
            detour: config.solver.detour,
            limiter: RateLimiter::from_millis(config.debug.min_publish_interval_ms),
            config,
            lifecycle: Lifecycle::Unconfigured,
            index: None,
            marks: MarkBuffer::default(),
            routes,
            grids,
            last_path: None,
            sink,
        })
    }

    #[inline]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn detour(&self) -> DetourMode {
        self.detour
    }

    /// Current grid index, once a geometry is known
    #[inline]
    pub fn grid_index(&self) -> Option<&GridIndex> {
        self.index.as_ref()
    }

    /// Handle for publishing reference routes
    pub fn route_mailbox(&self) -> Mailbox<Route> {
        self.routes.clone()
    }

    /// Handle for publishing cost grid snapshots
    pub fn grid_mailbox(&self) -> Mailbox<CostGrid> {
        self.grids.clone()
    }

    /// Publish a reference route. Returns false when not accepting input.
    pub fn set_path(&self, route: Route) -> bool {
        self.routes.publish(route)
    }

    /// Publish a cost grid snapshot. Returns false when not accepting input.
    pub fn set_cost_grid(&self, grid: CostGrid) -> bool {
        self.grids.publish(grid)
    }

    /// Start accepting route and grid input.
    ///
    /// Grid-sized resources are allocated on the first request, or earlier
    /// through [`set_param`](Planner::set_param).
    pub fn configure(&mut self) -> Result<()> {
        let next = self.lifecycle.apply(Transition::Configure)?;
        self.routes.open();
        self.grids.open();
        self.lifecycle = next;
        info!("Planner configured (detour {})", self.detour);
        Ok(())
    }

    pub fn activate(&mut self) -> Result<()> {
        self.lifecycle = self.lifecycle.apply(Transition::Activate)?;
        info!("Planner active");
        Ok(())
    }

    pub fn deactivate(&mut self) -> Result<()> {
        self.lifecycle = self.lifecycle.apply(Transition::Deactivate)?;
        info!("Planner inactive");
        Ok(())
    }

    /// Release buffers and stop accepting input.
    pub fn cleanup(&mut self) -> Result<()> {
        self.lifecycle = self.lifecycle.apply(Transition::Cleanup)?;
        self.marks.release();
        self.index = None;
        self.last_path = None;
        self.routes.close();
        self.grids.close();
        info!("Planner cleaned up");
        Ok(())
    }

    /// Replace grid geometry and detour mode together.
    ///
    /// The mark buffer is reallocated when the cell count changes.
    pub fn set_param(&mut self, geometry: GridGeometry, detour: DetourMode) -> Result<()> {
        self.refresh_index(&geometry)?;
        self.detour = detour;
        debug!("Parameters updated: {:?}, detour {}", geometry, detour);
        Ok(())
    }

    /// Validate and swap in a new configuration.
    ///
    /// The detour mode is reset to the one in `config`.
    pub fn update_config(&mut self, config: PlannerConfig) -> Result<()> {
        config.validate()?;
        self.detour = config.solver.detour;
        self.limiter = RateLimiter::from_millis(config.debug.min_publish_interval_ms);
        self.config = config;
        info!("Configuration updated (detour {})", self.detour);
        Ok(())
    }

    fn refresh_index(&mut self, geometry: &GridGeometry) -> Result<()> {
        if let Some(index) = self.index.as_mut() {
            if index.geometry() != geometry && index.set_param(*geometry)? {
                debug!("Grid resized to {}x{}", geometry.width, geometry.height);
            }
        } else {
            self.index = Some(GridIndex::new(*geometry)?);
        }
        self.marks.reset(geometry.cell_count());
        Ok(())
    }

    /// Repair the current reference route between `start` and `goal`.
    pub fn create_plan(&mut self, start: WorldPoint, goal: WorldPoint) -> Result<Plan> {
        self.lifecycle.require(Lifecycle::Active, "create_plan")?;

        let grid = self.grids.latest().ok_or(PlannerError::NoCostGrid)?;
        self.refresh_index(grid.geometry())?;
        let index = self.index.clone().ok_or(PlannerError::NoCostGrid)?;

        for (endpoint, point) in [(Endpoint::Start, start), (Endpoint::Goal, goal)] {
            if !index.contains(&point) {
                warn!("Rejecting plan: {} {:?} outside the grid", endpoint, point);
                return Err(PlannerError::OutOfBounds { endpoint, point });
            }
        }

        let reference = self
            .routes
            .latest()
            .filter(|r| !r.is_empty())
            .ok_or(PlannerError::NoReferenceRoute)?;

        let seed = self.seed_waypoints(&reference, start, goal, index.resolution());
        let mut path = WorkingPath::from_waypoints(&seed);
        let pinned = path.fix_outside(&index);
        if pinned > 0 {
            debug!("{} route nodes outside the grid kept fixed", pinned);
        }

        let map = ObstacleExtractor::new(&self.config.grid).extract(&grid, &index, &mut self.marks);
        debug!(
            "{} nodes, {} movable; {} obstacle groups",
            path.len(),
            path.movable_count(),
            map.groups().len()
        );

        let report = self.relax(&mut path, &map);

        if self.config.debug.publish_detour_candidates {
            for mode in [DetourMode::Left, DetourMode::Right] {
                let mut candidate = WorkingPath::from_waypoints(&seed);
                candidate.fix_outside(&index);
                RelaxationSolver::new(&self.config.solver, mode, &map).run(&mut candidate, |_, _| {});
                self.sink.detour_candidate(mode, &candidate.positions());
            }
        }

        let raw = path.route();
        self.last_path = Some(path);

        if report.state == SolverState::MaxIterationsExceeded && self.config.solver.fail_on_incomplete {
            return Err(PlannerError::ConvergenceIncomplete {
                iterations: report.iterations,
                residual: report.residual,
            });
        }

        let route = if self.config.path.normalize_output {
            raw.normalized(self.config.path.normalize_spacing)
        } else {
            raw
        };

        info!(
            "Plan: {} waypoints, {:.2} long, {:?} after {} rounds ({} obstacles in {} groups)",
            route.len(),
            route.length(),
            report.state,
            report.iterations,
            map.len(),
            map.groups().len()
        );

        Ok(Plan {
            route,
            report,
            detour: self.detour,
            obstacle_count: map.len(),
            group_count: map.groups().len(),
        })
    }

    /// Last working path, raw or resampled to `normalize_length`.
    ///
    /// Empty until a plan has been created.
    pub fn get_plan(&self, normalized: bool, normalize_length: f32) -> Route {
        match &self.last_path {
            Some(path) if normalized => path.route().normalized(normalize_length),
            Some(path) => path.route(),
            None => Route::default(),
        }
    }

    /// Reference route with its endpoints replaced, spaced for relaxation.
    fn seed_waypoints(&self, reference: &Route, start: WorldPoint, goal: WorldPoint, resolution: f32) -> Vec<WorldPoint> {
        let mut waypoints = reference.waypoints.clone();
        if waypoints.len() < 2 {
            waypoints = vec![start, goal];
        } else {
            waypoints[0] = start;
            let last = waypoints.len() - 1;
            waypoints[last] = goal;
        }
        let spacing = self.config.path.node_spacing.unwrap_or(resolution);
        normalize(&waypoints, spacing)
    }

    fn relax(&mut self, path: &mut WorkingPath, map: &ObstacleMap) -> SolverReport {
        let publish = self.config.debug.publish_iterations;
        let sink = &mut self.sink;
        let limiter = &mut self.limiter;
        limiter.reset();

        RelaxationSolver::new(&self.config.solver, self.detour, map).run(path, |iteration, path| {
            if publish && limiter.allow() {
                sink.iteration_path(iteration, &path.positions());
            }
        })
    }
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("lifecycle", &self.lifecycle)
            .field("detour", &self.detour)
            .field("index", &self.index)
            .field("has_last_path", &self.last_path.is_some())
            .finish()
    }
}
