//! Core data models shared by the grid and interpolation stages.

pub mod point;
pub mod surface;

pub use point::{Measure, MeasuredPoint, PointCollection};
pub use surface::{InterpolatedSurface, SurfaceNode};
