//! Praxis - geospatial sampling and interpolation utilities for soil data
//!
//! This library provides the shared types and stages used by the `sample`
//! and `surface` binaries: polygon grid generation, scattered-data
//! interpolation, and flattening of soil property API responses.

pub mod config;
pub mod error;
pub mod formats;
pub mod grid;
pub mod interpolate;
pub mod models;
pub mod projection;
pub mod soilgrid;

pub use error::{PraxisError, PraxisResult};
pub use grid::polygon_binning_to_points;
pub use interpolate::interpolate_point_measures;
pub use models::{InterpolatedSurface, Measure, MeasuredPoint, PointCollection};
pub use projection::Crs;
pub use soilgrid::{format_soilgrid_response, get_all_soilgrid_for_points};
