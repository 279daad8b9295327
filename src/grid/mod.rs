//! Cost grid access: coordinate conversion plus per-cell buffers.

mod buffer;
mod index;

pub use buffer::{costs, CostGrid, MarkBuffer};
pub use index::{GridGeometry, GridIndex};
