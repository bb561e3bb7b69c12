//! Reference frames and the projection used for metric grid stepping.
//!
//! Only two frames are supported: WGS 84 geographic coordinates (EPSG:4326)
//! and spherical Web Mercator (EPSG:3857).

use geo::{Coord, MapCoords, Polygon};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::error::{PraxisError, PraxisResult};

/// Radius of the Web Mercator sphere in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude at which Web Mercator becomes square.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Coordinate reference frame tag carried by every collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// Longitude/latitude in degrees
    Wgs84,
    /// Easting/northing in metres
    WebMercator,
}

impl Crs {
    pub fn from_epsg(code: u32) -> PraxisResult<Self> {
        match code {
            4326 => Ok(Crs::Wgs84),
            3857 => Ok(Crs::WebMercator),
            other => Err(PraxisError::InvalidInput(format!(
                "unsupported EPSG code {other} (expected 4326 or 3857)"
            ))),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Wgs84)
    }

    /// Transform a single coordinate from `self` into `target`.
    pub fn transform(&self, target: Crs, coord: Coord<f64>) -> Coord<f64> {
        match (self, target) {
            (Crs::Wgs84, Crs::WebMercator) => WebMercator.forward(coord),
            (Crs::WebMercator, Crs::Wgs84) => WebMercator.inverse(coord),
            _ => coord,
        }
    }

    pub fn transform_polygon(&self, target: Crs, polygon: &Polygon<f64>) -> Polygon<f64> {
        polygon.map_coords(|c| self.transform(target, c))
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Forward and inverse transforms between geographic degrees and a planar frame.
pub trait Projection {
    /// (lon, lat) in degrees -> (x, y) in metres
    fn forward(&self, coord: Coord<f64>) -> Coord<f64>;

    /// (x, y) in metres -> (lon, lat) in degrees
    fn inverse(&self, coord: Coord<f64>) -> Coord<f64>;
}

/// Spherical ("pseudo") Mercator as used by web maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn forward(&self, coord: Coord<f64>) -> Coord<f64> {
        // Poles map to infinity; clamp to the square extent.
        let lat = coord.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        Coord {
            x: EARTH_RADIUS_M * coord.x.to_radians(),
            y: EARTH_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
        }
    }

    fn inverse(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (coord.x / EARTH_RADIUS_M).to_degrees(),
            y: (2.0 * (coord.y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees(),
        }
    }
}
