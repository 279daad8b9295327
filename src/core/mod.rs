//! Core value types shared by every stage of the planner.
//!
//! - [`WorldPoint`]: continuous world coordinates (grid units scaled by resolution)
//! - [`GridCoord`]: integer cell indices into the cost grid

mod point;

pub use point::{GridCoord, WorldPoint};
