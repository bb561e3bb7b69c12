//! Scattered-data interpolation onto a regular lattice.
//!
//! Values are estimated by barycentric weights over the Delaunay
//! triangulation of the samples. Nothing is extrapolated: lattice nodes
//! outside the convex hull of the samples carry no value.

mod linear;
mod surface;

pub use linear::LinearInterpolator;
pub use surface::{interpolate_point_measures, lattice_axis, SurfaceInterpolator};
