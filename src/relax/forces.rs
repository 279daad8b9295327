//! Per-node force model.
//!
//! A node inside the influence radius of one or more obstacles gets
//!
//! - a radial push across the path, toward the side the weighted obstacle
//!   directions point to,
//! - a lateral push along the path normal toward the detour side, for
//!   obstacles in groups the reference route runs through,
//! - a smoothing pull toward the midpoint of its neighbours, with any part
//!   that would undo the push removed.
//!
//! Weights are linear in the clearance deficit, `w = R - d`.

use crate::config::{DetourMode, SolverConfig};
use crate::core::WorldPoint;

/// Distances below this count as the node sitting on the obstacle
const COINCIDENT_EPS: f32 = 1e-6;

/// Summed radial direction below this length is treated as cancelled
const CANCEL_EPS: f32 = 1e-6;

/// Obstacle-driven part of a node's displacement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Push {
    /// Radial plus lateral push
    pub vector: WorldPoint,
    /// Largest clearance deficit among nearby obstacles
    pub max_weight: f32,
}

/// Gains and geometry shared by every node of one solve.
#[derive(Clone, Copy, Debug)]
pub struct ForceModel {
    pub radius: f32,
    pub repulsion_gain: f32,
    pub lateral_gain: f32,
    pub smoothing_gain: f32,
    pub max_step: f32,
    side: f32,
    fallback: f32,
}

impl ForceModel {
    pub fn new(config: &SolverConfig, detour: DetourMode) -> Self {
        Self {
            radius: config.influence_radius,
            repulsion_gain: config.repulsion_gain,
            lateral_gain: config.lateral_gain,
            smoothing_gain: config.smoothing_gain,
            max_step: config.max_step,
            side: detour.side_sign(),
            fallback: detour.fallback_sign(),
        }
    }

    /// Left normal of the chord from `prev` to `next`.
    ///
    /// Zero when the neighbours coincide.
    #[inline]
    pub fn left_normal(prev: &WorldPoint, next: &WorldPoint) -> WorldPoint {
        (*next - *prev).normalize().perpendicular()
    }

    /// Push on a node at `position` from nearby obstacles.
    ///
    /// `nearby` yields each obstacle position with whether its group is
    /// crossed by the reference route. Returns `None` when no obstacle lies
    /// within the influence radius.
    pub fn push<I>(&self, position: WorldPoint, normal: WorldPoint, nearby: I) -> Option<Push>
    where
        I: IntoIterator<Item = (WorldPoint, bool)>,
    {
        let fallback_dir = normal * self.fallback;
        let mut sum = WorldPoint::ZERO;
        // Share of the sum from obstacles the route already passes by
        let mut beside = WorldPoint::ZERO;
        let mut max_weight = 0.0f32;
        let mut crossed_weight = 0.0f32;
        let mut any = false;

        for (obstacle, crossed) in nearby {
            let offset = position - obstacle;
            let d = offset.length();
            if d > self.radius {
                continue;
            }
            any = true;
            let w = self.radius - d;
            let dir = if d > COINCIDENT_EPS {
                offset * (1.0 / d)
            } else {
                fallback_dir
            };
            sum += dir * w;
            max_weight = max_weight.max(w);
            if crossed {
                crossed_weight = crossed_weight.max(w);
            } else {
                beside += dir * w;
            }
        }

        if !any {
            return None;
        }

        let radial = self.radial_direction(sum, normal) * (max_weight * self.repulsion_gain);
        let mut lateral = normal * (self.side * crossed_weight * self.lateral_gain);
        // No bias toward obstacles of groups the route only passes by
        if self.side * beside.dot(&normal) < -CANCEL_EPS {
            lateral = WorldPoint::ZERO;
        }

        Some(Push {
            vector: radial + lateral,
            max_weight,
        })
    }

    /// Unit direction of the radial push.
    ///
    /// Moving along the path does not gain clearance, so the summed direction
    /// is reduced to the side of the path it points to. A cancelled sum takes
    /// the fallback side.
    fn radial_direction(&self, sum: WorldPoint, normal: WorldPoint) -> WorldPoint {
        if normal.length() < CANCEL_EPS {
            return sum.normalize();
        }
        let across = sum.dot(&normal);
        if across.abs() < CANCEL_EPS {
            normal * self.fallback
        } else {
            normal * across.signum()
        }
    }

    /// Pull toward the neighbour midpoint, scaled down near obstacles.
    #[inline]
    pub fn smoothing(&self, position: WorldPoint, prev: &WorldPoint, next: &WorldPoint, max_weight: f32) -> WorldPoint {
        let proximity = (max_weight / self.radius).clamp(0.0, 1.0);
        (prev.midpoint(next) - position) * (self.smoothing_gain * (1.0 - proximity))
    }

    /// Displacement for a node under obstacle influence, capped at `max_step`.
    pub fn constrained_step(&self, push: &Push, smoothing: WorldPoint) -> WorldPoint {
        let mut smoothing = smoothing;
        let push_dir = push.vector.normalize();
        let along = smoothing.dot(&push_dir);
        if along < 0.0 {
            smoothing = smoothing - push_dir * along;
        }
        (push.vector + smoothing).clamp_length(self.max_step)
    }

    /// Displacement for a node with no obstacle in range, before backoff.
    #[inline]
    pub fn free_step(&self, position: WorldPoint, prev: &WorldPoint, next: &WorldPoint) -> WorldPoint {
        self.smoothing(position, prev, next, 0.0).clamp_length(self.max_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model(detour: DetourMode) -> ForceModel {
        let config = SolverConfig {
            influence_radius: 1.0,
            max_step: 10.0,
            ..SolverConfig::default()
        };
        ForceModel::new(&config, detour)
    }

    const EAST_NORMAL: WorldPoint = WorldPoint { x: 0.0, y: 1.0 };

    #[test]
    fn test_left_normal() {
        let n = ForceModel::left_normal(&WorldPoint::new(0.0, 0.0), &WorldPoint::new(2.0, 0.0));
        assert_relative_eq!(n.x, 0.0);
        assert_relative_eq!(n.y, 1.0);
        assert_eq!(
            ForceModel::left_normal(&WorldPoint::new(1.0, 1.0), &WorldPoint::new(1.0, 1.0)),
            WorldPoint::ZERO
        );
    }

    #[test]
    fn test_no_obstacle_in_range() {
        let m = model(DetourMode::Ignore);
        let far = [WorldPoint::new(5.0, 5.0)];
        assert!(m.push(WorldPoint::ZERO, EAST_NORMAL, far.map(|p| (p, true))).is_none());
    }

    #[test]
    fn test_radial_push_away_from_obstacle() {
        let m = model(DetourMode::Ignore);
        let push = m
            .push(WorldPoint::ZERO, EAST_NORMAL, [(WorldPoint::new(0.0, -0.4), false)])
            .unwrap();

        assert_relative_eq!(push.max_weight, 0.6, epsilon = 1e-6);
        assert_relative_eq!(push.vector.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(push.vector.y, 0.6 * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_symmetric_obstacles_fall_back_to_left() {
        let m = model(DetourMode::Ignore);
        let nearby = [(WorldPoint::new(-0.5, 0.0), true), (WorldPoint::new(0.5, 0.0), true)];
        let push = m.push(WorldPoint::ZERO, EAST_NORMAL, nearby).unwrap();
        assert!(push.vector.y > 0.0);
        assert_relative_eq!(push.vector.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_coincident_obstacle_uses_detour_side() {
        let on_top = [(WorldPoint::ZERO, true)];
        let left = model(DetourMode::Left).push(WorldPoint::ZERO, EAST_NORMAL, on_top).unwrap();
        let right = model(DetourMode::Right).push(WorldPoint::ZERO, EAST_NORMAL, on_top).unwrap();

        assert!(left.vector.y > 0.0);
        assert_relative_eq!(left.vector.y, -right.vector.y, epsilon = 1e-6);
        // Full deficit: radial and lateral both at their gains
        assert_relative_eq!(left.vector.y, 0.5 + 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_obstacle_ahead_pushes_across() {
        let m = model(DetourMode::Ignore);
        // Straight ahead: the sum has no normal part, so the fallback side is used
        let ahead = m
            .push(WorldPoint::ZERO, EAST_NORMAL, [(WorldPoint::new(0.5, 0.0), true)])
            .unwrap();
        assert_relative_eq!(ahead.vector.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ahead.vector.y, 0.5 * 0.5, epsilon = 1e-6);

        // Slightly below the path: full strength, upward
        let low = m
            .push(WorldPoint::ZERO, EAST_NORMAL, [(WorldPoint::new(0.5, -0.1), true)])
            .unwrap();
        assert_relative_eq!(low.vector.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(low.vector.y, low.max_weight * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_side_bias_overrides_radial_for_crossed_group() {
        // Obstacle left of the path in a group the route runs through
        let m = model(DetourMode::Left);
        let push = m
            .push(WorldPoint::ZERO, EAST_NORMAL, [(WorldPoint::new(0.0, 0.5), true)])
            .unwrap();
        assert_relative_eq!(push.vector.y, 0.5 * 0.8 - 0.5 * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_side_bias_ignores_obstacle_beside_route() {
        // Same obstacle, but the route only passes by its group
        let m = model(DetourMode::Left);
        let push = m
            .push(WorldPoint::ZERO, EAST_NORMAL, [(WorldPoint::new(0.0, 0.5), false)])
            .unwrap();
        assert_relative_eq!(push.vector.y, -0.5 * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_side_bias_dropped_toward_passed_obstacle() {
        // Crossed block below, wall above on the detour side
        let m = model(DetourMode::Left);
        let nearby = [
            (WorldPoint::new(0.0, -0.3), true),
            (WorldPoint::new(0.0, 0.6), false),
        ];
        let push = m.push(WorldPoint::ZERO, EAST_NORMAL, nearby).unwrap();
        assert_relative_eq!(push.max_weight, 0.7, epsilon = 1e-6);
        // Radial only: no lateral term toward the wall
        assert_relative_eq!(push.vector.y, 0.7 * 0.5, epsilon = 1e-6);

        // Right detour steers away from the wall, so the bias stays
        let right = model(DetourMode::Right).push(WorldPoint::ZERO, EAST_NORMAL, nearby).unwrap();
        assert_relative_eq!(right.vector.y, 0.7 * 0.5 - 0.7 * 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_smoothing_opposing_push_removed() {
        let m = model(DetourMode::Ignore);
        let push = Push {
            vector: WorldPoint::new(0.0, 0.2),
            max_weight: 0.4,
        };
        // Neighbours below pull the node down and sideways
        let smoothing = WorldPoint::new(0.1, -0.3);
        let step = m.constrained_step(&push, smoothing);
        assert_relative_eq!(step.x, 0.1, epsilon = 1e-6);
        assert_relative_eq!(step.y, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_free_step_capped() {
        let config = SolverConfig {
            max_step: 0.05,
            ..SolverConfig::default()
        };
        let m = ForceModel::new(&config, DetourMode::Ignore);
        let step = m.free_step(
            WorldPoint::new(0.0, 1.0),
            &WorldPoint::new(-1.0, 0.0),
            &WorldPoint::new(1.0, 0.0),
        );
        assert_relative_eq!(step.length(), 0.05, epsilon = 1e-6);
        assert!(step.y < 0.0);
    }
}
