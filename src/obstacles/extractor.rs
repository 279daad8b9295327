//! Threshold scan and flood-fill grouping of obstacle cells.

use std::collections::VecDeque;

use log::debug;

use crate::config::{Connectivity, GridSection, IndexBackend};
use crate::core::GridCoord;
use crate::grid::{CostGrid, GridIndex, MarkBuffer};

use super::spatial_index::{BucketGridIndex, RTreeIndex, SpatialIndex};
use super::types::{Obstacle, ObstacleGroup};
use super::ObstacleMap;

/// Bucket edge length for [`BucketGridIndex`], in cells.
const BUCKET_CELLS: f32 = 8.0;

/// Turns a cost grid into obstacles, groups and a proximity index.
#[derive(Clone, Debug)]
pub struct ObstacleExtractor {
    cost_threshold: u8,
    connectivity: Connectivity,
    max_group_radius: i32,
    backend: IndexBackend,
}

impl ObstacleExtractor {
    /// Create an extractor from the grid section of the configuration
    pub fn new(config: &GridSection) -> Self {
        Self {
            cost_threshold: config.cost_threshold,
            connectivity: config.connectivity,
            max_group_radius: config.max_group_radius.min(i32::MAX as u32) as i32,
            backend: config.spatial_index,
        }
    }

    /// Scan `grid` and cluster every cell with cost ≥ threshold.
    ///
    /// `marks` is cleared first (and resized if the grid size changed).
    /// Groups grow breadth-first from the first unmarked obstacle cell in
    /// row-major order and never extend more than `max_group_radius` cells
    /// (Chebyshev) from their seed.
    pub fn extract(&self, grid: &CostGrid, index: &GridIndex, marks: &mut MarkBuffer) -> ObstacleMap {
        let cell_count = grid.geometry().cell_count();
        marks.reset(cell_count);

        let width = grid.width();
        let mut obstacles: Vec<Obstacle> = Vec::new();
        let mut group_count = 0usize;
        let mut queue: VecDeque<GridCoord> = VecDeque::new();

        for seed_idx in 0..cell_count {
            if grid.cost(seed_idx) < self.cost_threshold || marks.is_marked(seed_idx) {
                continue;
            }

            let seed = GridCoord::new((seed_idx % width) as i32, (seed_idx / width) as i32);
            let group = group_count;
            group_count += 1;

            marks.mark(seed_idx);
            queue.push_back(seed);

            while let Some(cell) = queue.pop_front() {
                let Some(cell_idx) = index.index_of_cell(cell) else {
                    continue;
                };
                obstacles.push(Obstacle {
                    position: index.cell_center(cell),
                    cell,
                    cost: grid.cost(cell_idx),
                    group,
                });

                let n4;
                let n8;
                let neighbours: &[GridCoord] = match self.connectivity {
                    Connectivity::Four => {
                        n4 = cell.neighbors_4();
                        &n4
                    }
                    Connectivity::Eight => {
                        n8 = cell.neighbors_8();
                        &n8
                    }
                };

                for &next in neighbours {
                    if next.chebyshev_distance(&seed) > self.max_group_radius {
                        continue;
                    }
                    let Some(next_idx) = index.index_of_cell(next) else {
                        continue;
                    };
                    if grid.cost(next_idx) < self.cost_threshold {
                        continue;
                    }
                    if marks.mark(next_idx) {
                        queue.push_back(next);
                    }
                }
            }
        }

        // Every cell is claimed once, so dedup only guards the ordering invariant
        obstacles.sort();
        obstacles.dedup();

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); group_count];
        for (i, obstacle) in obstacles.iter().enumerate() {
            members[obstacle.group].push(i);
        }
        let groups: Vec<ObstacleGroup> = members
            .into_iter()
            .enumerate()
            .map(|(id, m)| ObstacleGroup::from_members(id, m, &obstacles))
            .collect();

        let positions: Vec<_> = obstacles.iter().map(|o| o.position).collect();
        let mut spatial: Box<dyn SpatialIndex + Send + Sync> = match self.backend {
            IndexBackend::Rtree => Box::new(RTreeIndex::new()),
            IndexBackend::Bucket => {
                Box::new(BucketGridIndex::new(index.resolution() * BUCKET_CELLS))
            }
        };
        spatial.insert(&positions);

        debug!(
            "Extracted {} obstacle cells in {} groups (threshold {})",
            obstacles.len(),
            groups.len(),
            self.cost_threshold
        );

        ObstacleMap::new(obstacles, groups, spatial, index.resolution())
    }
}
