//! Obstacle extraction from the cost grid.
//!
//! Cells at or above the cost threshold become [`Obstacle`]s, clustered into
//! [`ObstacleGroup`]s by flood fill. The resulting [`ObstacleMap`] answers the
//! proximity queries the relaxation solver makes once per node per round.

mod extractor;
mod spatial_index;
mod types;

pub use extractor::ObstacleExtractor;
pub use spatial_index::{BucketGridIndex, RTreeIndex, SpatialIndex};
pub use types::{Obstacle, ObstacleGroup};

use crate::core::WorldPoint;

/// Obstacles for one planning request.
///
/// Immutable once built; queries never modify the index.
pub struct ObstacleMap {
    obstacles: Vec<Obstacle>,
    groups: Vec<ObstacleGroup>,
    index: Box<dyn SpatialIndex + Send + Sync>,
    resolution: f32,
}

impl ObstacleMap {
    pub(crate) fn new(
        obstacles: Vec<Obstacle>,
        groups: Vec<ObstacleGroup>,
        index: Box<dyn SpatialIndex + Send + Sync>,
        resolution: f32,
    ) -> Self {
        Self {
            obstacles,
            groups,
            index,
            resolution,
        }
    }

    /// Map with no obstacles
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Box::new(RTreeIndex::new()), 0.0)
    }

    /// Edge length of an obstacle cell, zero for an empty map
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Obstacles sorted by cell (row-major)
    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn obstacle(&self, index: usize) -> &Obstacle {
        &self.obstacles[index]
    }

    #[inline]
    pub fn groups(&self) -> &[ObstacleGroup] {
        &self.groups
    }

    /// Number of obstacle cells
    #[inline]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Indices of obstacles within `max_distance` of `point`, ascending.
    #[inline]
    pub fn obstacles_near(&self, point: WorldPoint, max_distance: f32) -> Vec<usize> {
        self.index.within_radius(point, max_distance)
    }

    /// Whether any obstacle lies within `radius` of `point`.
    #[inline]
    pub fn any_within(&self, point: WorldPoint, radius: f32) -> bool {
        self.index.any_within(point, radius)
    }

    /// Flags, indexed by group id, the groups whose cells `route` runs through.
    ///
    /// The polyline is sampled every quarter cell. A sample on a cell edge
    /// counts as inside, so a route along the boundary of a group crosses it.
    pub fn groups_crossed(&self, route: &[WorldPoint]) -> Vec<bool> {
        let mut crossed = vec![false; self.groups.len()];
        let Some(&first) = route.first() else {
            return crossed;
        };
        if self.groups.is_empty() {
            return crossed;
        }

        let half = self.resolution * 0.5;
        // Any point inside a member cell is within a full cell of the centre box
        let reach = self.resolution;
        let mut visit = |point: WorldPoint| {
            for group in &self.groups {
                if crossed[group.id] || !group.may_influence(&point, reach) {
                    continue;
                }
                crossed[group.id] = group.members.iter().any(|&m| {
                    let local = point - self.obstacles[m].position;
                    local.x.abs() <= half && local.y.abs() <= half
                });
            }
        };

        visit(first);
        let step = (half * 0.5).max(f32::EPSILON);
        for w in route.windows(2) {
            let samples = (w[0].distance(&w[1]) / step).ceil().max(1.0) as usize;
            for k in 1..=samples {
                visit(w[0].lerp(&w[1], k as f32 / samples as f32));
            }
        }
        crossed
    }
}

impl std::fmt::Debug for ObstacleMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObstacleMap")
            .field("obstacles", &self.obstacles.len())
            .field("groups", &self.groups.len())
            .finish()
    }
}
