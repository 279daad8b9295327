//! Radius queries over obstacle positions.
//!
//! Both backends assign item ids sequentially in insertion order and return
//! query results sorted by id, so repeated queries with the same input give
//! the same output regardless of the backend's internal layout.
//!
//! - [`RTreeIndex`]: R*-tree from `rstar`, bulk loaded on first insert
//! - [`BucketGridIndex`]: uniform hash buckets, O(1) average lookup for
//!   radii close to the bucket size

use std::collections::HashMap;

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::core::WorldPoint;

/// Capability needed by the solver from a proximity structure.
pub trait SpatialIndex {
    /// Append points; ids continue from the current length.
    fn insert(&mut self, points: &[WorldPoint]);

    /// Ids of all points within `radius` (inclusive) of `center`, ascending.
    fn within_radius(&self, center: WorldPoint, radius: f32) -> Vec<usize>;

    /// Whether any point lies within `radius` of `center`.
    fn any_within(&self, center: WorldPoint, radius: f32) -> bool {
        !self.within_radius(center, radius).is_empty()
    }

    /// Number of indexed points
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every point
    fn clear(&mut self);
}

type IndexedPoint = GeomWithData<[f32; 2], usize>;

/// R*-tree backed index.
#[derive(Clone)]
pub struct RTreeIndex {
    tree: RTree<IndexedPoint>,
}

impl RTreeIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }
}

impl Default for RTreeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for RTreeIndex {
    fn insert(&mut self, points: &[WorldPoint]) {
        let start = self.tree.size();
        let items = points
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedPoint::new([p.x, p.y], start + i));

        if start == 0 {
            // Bulk loading gives a better balanced tree than repeated inserts
            self.tree = RTree::bulk_load(items.collect());
        } else {
            for item in items {
                self.tree.insert(item);
            }
        }
    }

    fn within_radius(&self, center: WorldPoint, radius: f32) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .tree
            .locate_within_distance([center.x, center.y], radius * radius)
            .map(|item| item.data)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn any_within(&self, center: WorldPoint, radius: f32) -> bool {
        self.tree
            .locate_within_distance([center.x, center.y], radius * radius)
            .next()
            .is_some()
    }

    fn len(&self) -> usize {
        self.tree.size()
    }

    fn clear(&mut self) {
        self.tree = RTree::new();
    }
}

/// Uniform bucket grid index.
#[derive(Clone, Debug)]
pub struct BucketGridIndex {
    bucket_size: f32,
    inv_bucket_size: f32,
    points: Vec<WorldPoint>,
    buckets: HashMap<(i32, i32), Vec<usize>>,
}

impl BucketGridIndex {
    /// Create an empty index with square buckets of `bucket_size` world units.
    pub fn new(bucket_size: f32) -> Self {
        let bucket_size = if bucket_size.is_finite() && bucket_size > 0.0 {
            bucket_size
        } else {
            1.0
        };
        Self {
            bucket_size,
            inv_bucket_size: 1.0 / bucket_size,
            points: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    #[inline]
    pub fn bucket_size(&self) -> f32 {
        self.bucket_size
    }

    #[inline]
    fn bucket_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x * self.inv_bucket_size).floor() as i32,
            (y * self.inv_bucket_size).floor() as i32,
        )
    }
}

impl SpatialIndex for BucketGridIndex {
    fn insert(&mut self, points: &[WorldPoint]) {
        for p in points {
            let id = self.points.len();
            self.points.push(*p);
            let key = self.bucket_of(p.x, p.y);
            self.buckets.entry(key).or_default().push(id);
        }
    }

    fn within_radius(&self, center: WorldPoint, radius: f32) -> Vec<usize> {
        let r2 = radius * radius;
        let (min_bx, min_by) = self.bucket_of(center.x - radius, center.y - radius);
        let (max_bx, max_by) = self.bucket_of(center.x + radius, center.y + radius);

        let mut ids = Vec::new();
        for bx in min_bx..=max_bx {
            for by in min_by..=max_by {
                if let Some(bucket) = self.buckets.get(&(bx, by)) {
                    ids.extend(
                        bucket
                            .iter()
                            .copied()
                            .filter(|&id| self.points[id].distance_squared(&center) <= r2),
                    );
                }
            }
        }
        ids.sort_unstable();
        ids
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn clear(&mut self) {
        self.points.clear();
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice() -> Vec<WorldPoint> {
        // 10x10 points, 0.5 apart; many share an axis value
        (0..100)
            .map(|i| WorldPoint::new((i % 10) as f32 * 0.5, (i / 10) as f32 * 0.5))
            .collect()
    }

    fn brute_force(points: &[WorldPoint], center: WorldPoint, radius: f32) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.distance_squared(&center) <= radius * radius)
            .map(|(i, _)| i)
            .collect()
    }

    fn check_backend(index: &mut dyn SpatialIndex) {
        let points = lattice();
        index.insert(&points);
        assert_eq!(index.len(), 100);

        for &(cx, cy, r) in &[(2.2, 2.2, 0.7), (0.0, 0.0, 0.5), (4.5, 4.5, 10.0), (-3.0, -3.0, 1.0)] {
            let center = WorldPoint::new(cx, cy);
            assert_eq!(
                index.within_radius(center, r),
                brute_force(&points, center, r),
                "query ({}, {}) r={}",
                cx,
                cy,
                r
            );
        }

        assert!(index.any_within(WorldPoint::new(1.1, 1.1), 0.2));
        assert!(!index.any_within(WorldPoint::new(-1.0, -1.0), 0.5));

        // Ids continue after the first batch
        index.insert(&[WorldPoint::new(10.0, 10.0)]);
        assert_eq!(index.within_radius(WorldPoint::new(10.0, 10.0), 0.1), vec![100]);

        index.clear();
        assert!(index.is_empty());
        assert!(index.within_radius(WorldPoint::new(1.0, 1.0), 5.0).is_empty());
    }

    #[test]
    fn test_rtree_matches_brute_force() {
        let mut index = RTreeIndex::new();
        check_backend(&mut index);
    }

    #[test]
    fn test_bucket_grid_matches_brute_force() {
        let mut index = BucketGridIndex::new(1.0);
        check_backend(&mut index);
    }

    #[test]
    fn test_repeated_queries_identical() {
        let mut index = RTreeIndex::new();
        index.insert(&lattice());
        let center = WorldPoint::new(2.0, 3.0);
        let first = index.within_radius(center, 1.2);
        for _ in 0..5 {
            assert_eq!(index.within_radius(center, 1.2), first);
        }
    }
}
