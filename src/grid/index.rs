//! World ↔ map coordinate conversion.
//!
//! Map coordinates are fractional cell coordinates: cell (x, y) covers
//! `[x, x + 1) × [y, y + 1)`, so its centre sits at
//! `origin + (x + 0.5, y + 0.5) * resolution` in world coordinates.

use serde::{Deserialize, Serialize};

use crate::core::{GridCoord, WorldPoint};
use crate::error::{PlannerError, Result};

/// Grid dimensions and placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// World coordinates of the corner of cell (0, 0)
    pub origin: WorldPoint,
    /// World units per cell
    pub resolution: f32,
}

impl GridGeometry {
    /// Create a geometry record (unvalidated)
    pub fn new(width: usize, height: usize, origin: WorldPoint, resolution: f32) -> Self {
        Self {
            width,
            height,
            origin,
            resolution,
        }
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Check that the geometry describes a usable grid.
    pub fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(PlannerError::InvalidConfiguration(format!(
                "grid resolution must be positive, got {}",
                self.resolution
            )));
        }
        if !self.origin.is_finite() {
            return Err(PlannerError::InvalidConfiguration(
                "grid origin must be finite".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(PlannerError::EmptyGrid);
        }
        Ok(())
    }
}

/// Coordinate conversions for one grid geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct GridIndex {
    geometry: GridGeometry,
}

impl GridIndex {
    /// Build an index, rejecting degenerate geometry.
    pub fn new(geometry: GridGeometry) -> Result<Self> {
        geometry.validate()?;
        Ok(Self { geometry })
    }

    /// Replace the geometry.
    ///
    /// Returns `true` when the cell count changed, meaning buffers sized by the
    /// old geometry must be reallocated.
    pub fn set_param(&mut self, geometry: GridGeometry) -> Result<bool> {
        geometry.validate()?;
        let resized = geometry.cell_count() != self.geometry.cell_count();
        self.geometry = geometry;
        Ok(resized)
    }

    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.geometry.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.geometry.height
    }

    #[inline]
    pub fn resolution(&self) -> f32 {
        self.geometry.resolution
    }

    #[inline]
    pub fn origin(&self) -> WorldPoint {
        self.geometry.origin
    }

    /// World → fractional map coordinates, `None` outside `[0, width) × [0, height)`.
    #[inline]
    pub fn world_to_map(&self, wx: f32, wy: f32) -> Option<(f32, f32)> {
        let mx = (wx - self.geometry.origin.x) / self.geometry.resolution;
        let my = (wy - self.geometry.origin.y) / self.geometry.resolution;
        if mx >= 0.0 && my >= 0.0 && mx < self.width() as f32 && my < self.height() as f32 {
            Some((mx, my))
        } else {
            None
        }
    }

    /// Fractional map → world coordinates.
    #[inline]
    pub fn map_to_world(&self, mx: f32, my: f32) -> (f32, f32) {
        (
            self.geometry.origin.x + mx * self.geometry.resolution,
            self.geometry.origin.y + my * self.geometry.resolution,
        )
    }

    /// Linear offset of the cell containing map coordinate (mx, my).
    ///
    /// Caller guarantees the coordinate is in bounds.
    #[inline]
    pub fn index(&self, mx: f32, my: f32) -> usize {
        (my.floor() as usize) * self.width() + (mx.floor() as usize)
    }

    /// Linear offset of the cell containing a world point.
    #[inline]
    pub fn index_of_point(&self, point: &WorldPoint) -> Option<usize> {
        self.world_to_map(point.x, point.y)
            .map(|(mx, my)| self.index(mx, my))
    }

    /// Linear offset of an integer cell, `None` out of bounds.
    #[inline]
    pub fn index_of_cell(&self, cell: GridCoord) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x < self.width() && y < self.height() {
            Some(y * self.width() + x)
        } else {
            None
        }
    }

    /// World position of a cell's centre.
    #[inline]
    pub fn cell_center(&self, cell: GridCoord) -> WorldPoint {
        let (wx, wy) = self.map_to_world(cell.x as f32 + 0.5, cell.y as f32 + 0.5);
        WorldPoint::new(wx, wy)
    }

    /// Check if a world point lies on the grid
    #[inline]
    pub fn contains(&self, point: &WorldPoint) -> bool {
        self.world_to_map(point.x, point.y).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> GridIndex {
        GridIndex::new(GridGeometry::new(
            20,
            10,
            WorldPoint::new(-1.0, 2.0),
            0.05,
        ))
        .unwrap()
    }

    #[test]
    fn test_round_trip_all_cells() {
        let idx = index();
        for y in 0..idx.height() {
            for x in 0..idx.width() {
                // Sample the cell centre so rounding cannot push it over an edge
                let (mx, my) = (x as f32 + 0.5, y as f32 + 0.5);
                let (wx, wy) = idx.map_to_world(mx, my);
                let (rx, ry) = idx.world_to_map(wx, wy).unwrap();
                assert!((rx - mx).abs() < 1e-3, "x {} -> {}", mx, rx);
                assert!((ry - my).abs() < 1e-3, "y {} -> {}", my, ry);
            }
        }
    }

    #[test]
    fn test_out_of_bounds_fails() {
        let idx = index();
        assert!(idx.world_to_map(-1.01, 2.1).is_none());
        assert!(idx.world_to_map(-0.5, 1.99).is_none());
        assert!(idx.world_to_map(0.01, 2.1).is_none());
        assert!(idx.world_to_map(-0.5, 2.51).is_none());
        assert!(idx.world_to_map(-0.5, 2.1).is_some());
    }

    #[test]
    fn test_linear_index() {
        let idx = index();
        assert_eq!(idx.index(0.0, 0.0), 0);
        assert_eq!(idx.index(3.7, 2.2), 2 * 20 + 3);
        assert_eq!(
            idx.index_of_point(&WorldPoint::new(-1.0 + 0.05 * 4.5, 2.0 + 0.05 * 1.5)),
            Some(24)
        );
        assert_eq!(idx.index_of_point(&WorldPoint::new(5.0, 5.0)), None);
        assert_eq!(idx.index_of_cell(GridCoord::new(19, 9)), Some(199));
        assert_eq!(idx.index_of_cell(GridCoord::new(20, 0)), None);
        assert_eq!(idx.index_of_cell(GridCoord::new(-1, 0)), None);
    }

    #[test]
    fn test_cell_center_lies_in_its_cell() {
        let idx = index();
        let center = idx.cell_center(GridCoord::new(4, 1));
        assert!((center.x - (-1.0 + 0.05 * 4.5)).abs() < 1e-6);
        assert!((center.y - (2.0 + 0.05 * 1.5)).abs() < 1e-6);
        assert_eq!(idx.index_of_point(&center), idx.index_of_cell(GridCoord::new(4, 1)));
    }

    #[test]
    fn test_invalid_geometry() {
        let zero_res = GridGeometry::new(10, 10, WorldPoint::ZERO, 0.0);
        assert!(matches!(
            GridIndex::new(zero_res),
            Err(PlannerError::InvalidConfiguration(_))
        ));
        let empty = GridGeometry::new(0, 10, WorldPoint::ZERO, 1.0);
        assert!(matches!(GridIndex::new(empty), Err(PlannerError::EmptyGrid)));
    }

    #[test]
    fn test_set_param_reports_resize() {
        let mut idx = index();
        let moved = GridGeometry::new(20, 10, WorldPoint::ZERO, 0.1);
        assert!(!idx.set_param(moved).unwrap());
        assert_eq!(idx.resolution(), 0.1);

        let bigger = GridGeometry::new(40, 10, WorldPoint::ZERO, 0.1);
        assert!(idx.set_param(bigger).unwrap());
        assert_eq!(idx.width(), 40);

        // Rejected geometry leaves the index untouched
        let bad = GridGeometry::new(40, 10, WorldPoint::ZERO, -1.0);
        assert!(idx.set_param(bad).is_err());
        assert_eq!(idx.width(), 40);
    }
}
