//! Dense per-cell buffers.
//!
//! Both buffers are row-major (`index = y * width + x`).

use crate::error::{PlannerError, Result};

use super::index::GridGeometry;

/// Cost thresholds matching the usual occupancy costmap convention
pub mod costs {
    /// Free space
    pub const FREE: u8 = 0;
    /// Within the robot's inscribed radius of an obstacle
    pub const INSCRIBED: u8 = 254;
    /// Occupied
    pub const LETHAL: u8 = 255;
}

/// One snapshot of the cost grid.
///
/// Replaced wholesale whenever the mapping side publishes a new grid.
#[derive(Clone, Debug)]
pub struct CostGrid {
    geometry: GridGeometry,
    costs: Vec<u8>,
}

impl CostGrid {
    /// Wrap a cost array, checking it matches the geometry.
    pub fn new(geometry: GridGeometry, costs: Vec<u8>) -> Result<Self> {
        geometry.validate()?;
        if costs.len() != geometry.cell_count() {
            return Err(PlannerError::EmptyGrid);
        }
        Ok(Self { geometry, costs })
    }

    /// Grid with every cell set to one cost
    pub fn filled(geometry: GridGeometry, cost: u8) -> Result<Self> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            costs: vec![cost; geometry.cell_count()],
        })
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

    /// Raw cost array
    #[inline]
    pub fn costs(&self) -> &[u8] {
        &self.costs
    }

    /// Cost at a linear index
    #[inline]
    pub fn cost(&self, index: usize) -> u8 {
        self.costs[index]
    }

    /// Cost at a cell, `None` out of bounds
    #[inline]
    pub fn cost_at(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width() && y < self.height() {
            Some(self.costs[y * self.width() + x])
        } else {
            None
        }
    }

    /// Set one cell's cost; out-of-bounds writes are ignored.
    #[inline]
    pub fn set_cost(&mut self, x: usize, y: usize, cost: u8) {
        if x < self.width() && y < self.height() {
            let w = self.width();
            self.costs[y * w + x] = cost;
        }
    }

    /// Fill an inclusive cell rectangle, clipped to the grid.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, cost: u8) {
        let x_end = x1.min(self.width().saturating_sub(1));
        let y_end = y1.min(self.height().saturating_sub(1));
        for y in y0..=y_end {
            for x in x0..=x_end {
                self.set_cost(x, y, cost);
            }
        }
    }

    /// Highest cost in the grid
    pub fn max_cost(&self) -> u8 {
        self.costs.iter().copied().max().unwrap_or(costs::FREE)
    }
}

/// Visited flags for obstacle extraction.
///
/// Allocated once per grid size and cleared at the start of each pass.
#[derive(Clone, Debug, Default)]
pub struct MarkBuffer {
    marks: Vec<bool>,
}

impl MarkBuffer {
    /// Buffer for a grid with `cells` cells
    pub fn new(cells: usize) -> Self {
        Self {
            marks: vec![false; cells],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Clear all marks. Reallocates only if the size differs.
    pub fn reset(&mut self, cells: usize) {
        if self.marks.len() == cells {
            self.marks.fill(false);
        } else {
            self.marks = vec![false; cells];
        }
    }

    /// Drop the storage entirely.
    pub fn release(&mut self) {
        self.marks = Vec::new();
    }

    #[inline]
    pub fn is_marked(&self, index: usize) -> bool {
        self.marks[index]
    }

    /// Mark a cell, returning `false` if it was already marked.
    #[inline]
    pub fn mark(&mut self, index: usize) -> bool {
        !std::mem::replace(&mut self.marks[index], true)
    }

    /// Number of marked cells
    pub fn count(&self) -> usize {
        self.marks.iter().filter(|&&m| m).count()
    }
}
