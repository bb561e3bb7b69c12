use geo::{Area, BoundingRect, Contains, Coord, Geometry, Intersects, Polygon};
use geo_types::Point;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::GridConfig;
use crate::error::{PraxisError, PraxisResult};
use crate::models::{MeasuredPoint, PointCollection};
use crate::projection::Crs;

/// How lattice nodes lying exactly on the polygon edge are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Only strictly interior nodes
    #[default]
    Exclusive,
    /// Interior nodes plus nodes on the boundary
    Inclusive,
}

impl BoundaryPolicy {
    fn accepts(&self, polygon: &Polygon<f64>, point: &Point<f64>) -> bool {
        match self {
            BoundaryPolicy::Exclusive => polygon.contains(point),
            BoundaryPolicy::Inclusive => polygon.intersects(point),
        }
    }
}

/// Generates sample points inside a polygon at a fixed metric spacing
#[derive(Debug, Clone)]
pub struct GridGenerator {
    resolution_m: f64,
    boundary: BoundaryPolicy,
    geographic: Crs,
    planar: Crs,
}

impl GridGenerator {
    pub fn new(config: &GridConfig) -> PraxisResult<Self> {
        Ok(Self {
            resolution_m: config.resolution_m,
            boundary: config.boundary,
            geographic: config.geographic_crs()?,
            planar: config.planar_crs()?,
        })
    }

    pub fn with_resolution(mut self, resolution_m: f64) -> Self {
        self.resolution_m = resolution_m;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn resolution_m(&self) -> f64 {
        self.resolution_m
    }

    /// Lattice nodes inside `polygon`, returned in the geographic frame.
    ///
    /// The lattice starts at the minimum corner of the projected bounding box
    /// and walks x in the outer loop, y in the inner loop, so the output order
    /// is stable for a given polygon and resolution.
    pub fn generate(&self, polygon: &Polygon<f64>) -> PointCollection {
        let mut result = PointCollection::new(self.geographic);

        if !(self.resolution_m.is_finite() && self.resolution_m > 0.0) {
            warn!(
                "Resolution {} m is not positive, returning no grid points",
                self.resolution_m
            );
            return result;
        }

        let projected = self.geographic.transform_polygon(self.planar, polygon);
        if projected.unsigned_area() == 0.0 {
            debug!("Polygon is empty or degenerate, returning no grid points");
            return result;
        }

        let rect = match projected.bounding_rect() {
            Some(r) => r,
            None => return result,
        };
        let (min, max) = (rect.min(), rect.max());

        let nx = lattice_len(min.x, max.x, self.resolution_m);
        let ny = lattice_len(min.y, max.y, self.resolution_m);
        info!(
            "Walking {}x{} lattice at {} m over {:.0}x{:.0} m extent",
            nx,
            ny,
            self.resolution_m,
            rect.width(),
            rect.height()
        );

        for i in 0..nx {
            let x = min.x + i as f64 * self.resolution_m;
            for j in 0..ny {
                let y = min.y + j as f64 * self.resolution_m;
                let node = Point::new(x, y);
                if self.boundary.accepts(&projected, &node) {
                    let lonlat: Coord<f64> = self.planar.transform(self.geographic, node.0);
                    result.push(MeasuredPoint::new(lonlat.x, lonlat.y));
                }
            }
        }

        info!("Generated {} grid points inside polygon", result.len());
        result
    }
}

/// Number of lattice positions `min + k * step` strictly below `max`.
fn lattice_len(min: f64, max: f64, step: f64) -> usize {
    let span = max - min;
    if span <= 0.0 {
        return 0;
    }
    let n = (span / step).ceil() as usize;
    // Guard the k == n edge where rounding puts min + n * step just below max
    if min + n as f64 * step < max {
        n + 1
    } else {
        n
    }
}

/// Convert a single polygon layer into lattice points spaced `resolution_m`
/// metres apart, using default frames (EPSG:4326 in and out, EPSG:3857 for
/// stepping) and exclusive boundaries.
pub fn polygon_binning_to_points(
    geometries: &[Geometry<f64>],
    resolution_m: f64,
) -> PraxisResult<PointCollection> {
    let polygon = single_polygon(geometries)?;
    let generator = GridGenerator::new(&GridConfig::default())?.with_resolution(resolution_m);
    Ok(generator.generate(polygon))
}

/// Extract the one polygon a layer is expected to hold.
pub fn single_polygon(geometries: &[Geometry<f64>]) -> PraxisResult<&Polygon<f64>> {
    match geometries {
        [] => Err(PraxisError::InvalidInput(
            "expected exactly one polygon, got no geometry".into(),
        )),
        [Geometry::Polygon(p)] => Ok(p),
        [Geometry::MultiPolygon(mp)] if mp.0.len() == 1 => Ok(&mp.0[0]),
        [Geometry::MultiPolygon(mp)] => Err(PraxisError::InvalidInput(format!(
            "expected exactly one polygon, got a multipolygon with {} parts",
            mp.0.len()
        ))),
        [_] => Err(PraxisError::InvalidInput(
            "expected a polygon geometry".into(),
        )),
        many => Err(PraxisError::InvalidInput(format!(
            "expected exactly one polygon, got {} geometries",
            many.len()
        ))),
    }
}
