//! Polygon-to-lattice sampling.
//!
//! Reprojects a single polygon into a metric frame, walks a regular lattice
//! over its bounding box and keeps the nodes that fall inside.

mod generator;

pub use generator::{polygon_binning_to_points, single_polygon, BoundaryPolicy, GridGenerator};
