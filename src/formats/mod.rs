//! File formats used by the command-line tools.

pub mod delimited;
pub mod geojson;

pub use delimited::{read_points, write_points, write_surface};
pub use geojson::{parse_geometries, read_geometries, write_points_geojson};
