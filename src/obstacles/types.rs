//! Obstacle cells and the groups they cluster into.

use std::cmp::Ordering;

use crate::core::{GridCoord, WorldPoint};

/// A single grid cell at or above the cost threshold.
#[derive(Clone, Copy, Debug)]
pub struct Obstacle {
    /// World position of the cell centre
    pub position: WorldPoint,
    /// Cell coordinate
    pub cell: GridCoord,
    /// Cell cost
    pub cost: u8,
    /// Id of the owning [`ObstacleGroup`]
    pub group: usize,
}

// Identity is the cell: two obstacles from the same cell are the same obstacle.
impl PartialEq for Obstacle {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for Obstacle {}

impl Ord for Obstacle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cell.cmp(&other.cell)
    }
}

impl PartialOrd for Obstacle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Connected cluster of obstacle cells.
#[derive(Clone, Debug)]
pub struct ObstacleGroup {
    /// Group id (position in the group list)
    pub id: usize,
    /// Indices into the obstacle list
    pub members: Vec<usize>,
    /// Mean member position
    pub centroid: WorldPoint,
    /// Lower-left corner of the box spanned by member centres
    pub min: WorldPoint,
    /// Upper-right corner of the box spanned by member centres
    pub max: WorldPoint,
    /// Highest member cost
    pub peak_cost: u8,
}

impl ObstacleGroup {
    /// Build group bookkeeping from its members.
    ///
    /// `members` must be non-empty.
    pub(crate) fn from_members(id: usize, members: Vec<usize>, obstacles: &[Obstacle]) -> Self {
        let mut min = WorldPoint::new(f32::MAX, f32::MAX);
        let mut max = WorldPoint::new(f32::MIN, f32::MIN);
        let mut sum = WorldPoint::ZERO;
        let mut peak_cost = 0u8;

        for &i in &members {
            let p = obstacles[i].position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            sum += p;
            peak_cost = peak_cost.max(obstacles[i].cost);
        }

        let centroid = sum * (1.0 / members.len().max(1) as f32);
        Self {
            id,
            members,
            centroid,
            min,
            max,
            peak_cost,
        }
    }

    /// Number of cells in the group
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Lower bound on the distance from `point` to any member.
    ///
    /// Zero when the point lies inside the bounding box.
    pub fn distance_bound(&self, point: &WorldPoint) -> f32 {
        let dx = (self.min.x - point.x).max(0.0).max(point.x - self.max.x);
        let dy = (self.min.y - point.y).max(0.0).max(point.y - self.max.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether any member could lie within `radius` of `point`.
    #[inline]
    pub fn may_influence(&self, point: &WorldPoint, radius: f32) -> bool {
        self.distance_bound(point) <= radius
    }
}
