//! Path representations.
//!
//! - [`Route`]: ordered waypoints exchanged with callers
//! - [`WorkingPath`]: the node sequence the solver relaxes
//! - [`resample`]: arc-length normalization

mod node;
pub mod resample;

pub use node::{nodes_from_path, Node, WorkingPath};
pub use resample::{normalize, path_length};

use serde::{Deserialize, Serialize};

use crate::core::WorldPoint;

/// Ordered list of waypoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<WorldPoint>,
}

impl Route {
    pub fn new(waypoints: Vec<WorldPoint>) -> Self {
        Self { waypoints }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[inline]
    pub fn first(&self) -> Option<&WorldPoint> {
        self.waypoints.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&WorldPoint> {
        self.waypoints.last()
    }

    /// Total arc length
    pub fn length(&self) -> f32 {
        path_length(&self.waypoints)
    }

    /// Copy resampled to `spacing` (see [`normalize`])
    pub fn normalized(&self, spacing: f32) -> Route {
        Route::new(normalize(&self.waypoints, spacing))
    }
}

impl From<Vec<WorldPoint>> for Route {
    fn from(waypoints: Vec<WorldPoint>) -> Self {
        Self::new(waypoints)
    }
}

impl WorkingPath {
    /// Node positions as a route
    pub fn route(&self) -> Route {
        Route::new(self.positions())
    }
}
