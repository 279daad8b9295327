//! Iterative node relaxation.

use log::{debug, trace, warn};
use serde::Serialize;

use crate::config::{DetourMode, SolverConfig};
use crate::core::WorldPoint;
use crate::obstacles::ObstacleMap;
use crate::path::WorkingPath;

use super::forces::ForceModel;

/// Halvings tried before a smoothing step that enters obstacle influence is dropped
pub const MAX_BACKOFF_HALVINGS: usize = 5;

/// Smallest influence radius in cells. Above the half diagonal, so a node
/// clear of every cell centre is also outside every cell.
const MIN_RADIUS_CELLS: f32 = 0.75;

/// Solver progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverState {
    /// Nodes built, no round run yet
    Seeded,
    /// At least one round run, not terminal
    Iterating,
    /// Largest displacement of the last round fell below tolerance
    Converged,
    /// Iteration cap reached before convergence
    MaxIterationsExceeded,
}

impl SolverState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SolverState::Converged | SolverState::MaxIterationsExceeded)
    }
}

/// Outcome of a solve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SolverReport {
    pub state: SolverState,
    /// Rounds run
    pub iterations: usize,
    /// Largest node displacement in the last round
    pub residual: f32,
}

/// Moves path nodes away from obstacles until the path settles.
///
/// Each round reads the positions left by the previous one, so node order
/// does not affect the result. The detour side applies only to obstacle
/// groups that the path runs through when the first round starts.
pub struct RelaxationSolver<'a> {
    model: ForceModel,
    tolerance: f32,
    max_iterations: usize,
    obstacles: &'a ObstacleMap,
    /// Indexed by group id
    crossed: Vec<bool>,
    state: SolverState,
    iterations: usize,
    residual: f32,
}

impl<'a> RelaxationSolver<'a> {
    pub fn new(config: &SolverConfig, detour: DetourMode, obstacles: &'a ObstacleMap) -> Self {
        let mut model = ForceModel::new(config, detour);
        let floor = obstacles.resolution() * MIN_RADIUS_CELLS;
        if model.radius < floor {
            debug!(
                "Influence radius {:.3} below {:.3} on {:.3} cells, raising it",
                model.radius, floor, obstacles.resolution()
            );
            model.radius = floor;
        }

        Self {
            model,
            tolerance: config.convergence_tolerance,
            max_iterations: config.max_iterations,
            obstacles,
            crossed: Vec::new(),
            state: SolverState::Seeded,
            iterations: 0,
            residual: 0.0,
        }
    }

    /// Influence radius in use, after the cell-size floor
    #[inline]
    pub fn influence_radius(&self) -> f32 {
        self.model.radius
    }

    #[inline]
    pub fn state(&self) -> SolverState {
        self.state
    }

    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn report(&self) -> SolverReport {
        SolverReport {
            state: self.state,
            iterations: self.iterations,
            residual: self.residual,
        }
    }

    /// Run one round and update the state. Returns the new state.
    ///
    /// Does nothing once a terminal state is reached.
    pub fn step(&mut self, path: &mut WorkingPath) -> SolverState {
        if self.state.is_terminal() {
            return self.state;
        }
        if self.state == SolverState::Seeded {
            self.crossed = self.obstacles.groups_crossed(&path.positions());
            debug!(
                "Route runs through {} of {} obstacle groups",
                self.crossed.iter().filter(|&&c| c).count(),
                self.crossed.len()
            );
        }

        self.residual = self.relax_round(path);
        self.iterations += 1;

        self.state = if self.residual < self.tolerance {
            SolverState::Converged
        } else if self.iterations >= self.max_iterations {
            SolverState::MaxIterationsExceeded
        } else {
            SolverState::Iterating
        };

        trace!(
            "Relaxation round {}: residual {:.5}",
            self.iterations,
            self.residual
        );
        self.state
    }

    /// Iterate to a terminal state, calling `observer` after every round.
    pub fn run<F>(&mut self, path: &mut WorkingPath, mut observer: F) -> SolverReport
    where
        F: FnMut(usize, &WorkingPath),
    {
        while !self.state.is_terminal() {
            self.step(path);
            observer(self.iterations, path);
        }

        match self.state {
            SolverState::Converged => debug!(
                "Relaxation converged after {} rounds (residual {:.5})",
                self.iterations, self.residual
            ),
            _ => warn!(
                "Relaxation stopped at the {} round cap (residual {:.5})",
                self.iterations, self.residual
            ),
        }
        self.report()
    }

    fn relax_round(&self, path: &mut WorkingPath) -> f32 {
        path.reset();
        let previous = path.positions();
        let count = previous.len();
        if count < 3 {
            return 0.0;
        }

        let mut residual = 0.0f32;
        for (i, node) in path.nodes_mut().iter_mut().enumerate().take(count - 1).skip(1) {
            if node.fixed {
                continue;
            }
            let position = previous[i];
            let prev = previous[i - 1];
            let next = previous[i + 1];

            let nearby = self.obstacles.obstacles_near(position, self.model.radius);
            let displacement = if nearby.is_empty() {
                self.safe_free_step(position, &prev, &next)
            } else {
                let normal = ForceModel::left_normal(&prev, &next);
                let positions = nearby.iter().map(|&o| {
                    let obstacle = self.obstacles.obstacle(o);
                    let crossed = self.crossed.get(obstacle.group).copied().unwrap_or(false);
                    (obstacle.position, crossed)
                });
                match self.model.push(position, normal, positions) {
                    Some(push) => {
                        let smoothing = self.model.smoothing(position, &prev, &next, push.max_weight);
                        self.model.constrained_step(&push, smoothing)
                    }
                    None => self.safe_free_step(position, &prev, &next),
                }
            };

            node.nearby = nearby;
            node.displacement = displacement;
            node.position = position + displacement;
            residual = residual.max(displacement.length());
        }
        residual
    }

    /// Smoothing step for a clear node, backed off so it stays clear.
    fn safe_free_step(&self, position: WorldPoint, prev: &WorldPoint, next: &WorldPoint) -> WorldPoint {
        let mut step = self.model.free_step(position, prev, next);
        for _ in 0..MAX_BACKOFF_HALVINGS {
            if !self.obstacles.any_within(position + step, self.model.radius) {
                return step;
            }
            step = step * 0.5;
        }
        WorldPoint::ZERO
    }
}
