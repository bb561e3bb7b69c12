use tracing::{debug, info};

use super::LinearInterpolator;
use crate::config::InterpolationConfig;
use crate::error::{PraxisError, PraxisResult};
use crate::models::{InterpolatedSurface, PointCollection, SurfaceNode};

/// `steps` evenly spaced positions from `min` to `max`, both ends included.
pub fn lattice_axis(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let last = (steps - 1) as f64;
            (0..steps)
                .map(|i| {
                    if i == steps - 1 {
                        max
                    } else {
                        min + (max - min) * (i as f64 / last)
                    }
                })
                .collect()
        }
    }
}

/// Interpolates selected point measures onto a fixed-size lattice
#[derive(Debug, Clone)]
pub struct SurfaceInterpolator {
    steps: usize,
}

impl SurfaceInterpolator {
    pub fn new(config: &InterpolationConfig) -> PraxisResult<Self> {
        config.validate()?;
        Ok(Self {
            steps: config.steps,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Build the surface for `attributes` over the bounding box of `points`.
    ///
    /// Each attribute is triangulated on its own, from the points that carry
    /// a finite numeric value for it.
    pub fn interpolate<S: AsRef<str>>(
        &self,
        points: &PointCollection,
        attributes: &[S],
    ) -> PraxisResult<InterpolatedSurface> {
        if points.is_empty() {
            return Err(PraxisError::InsufficientData(
                "cannot interpolate an empty point collection".into(),
            ));
        }
        for name in attributes {
            if !points.has_attribute(name.as_ref()) {
                return Err(PraxisError::MissingAttribute(format!(
                    "'{}' is not present on the input points (available: {})",
                    name.as_ref(),
                    points.schema().join(", ")
                )));
            }
        }

        let bounds = points.bounds()?;
        let xs = lattice_axis(bounds.min().x, bounds.max().x, self.steps);
        let ys = lattice_axis(bounds.min().y, bounds.max().y, self.steps);

        info!(
            "Interpolating {} attribute(s) from {} points onto a {}x{} lattice",
            attributes.len(),
            points.len(),
            self.steps,
            self.steps
        );

        let positions: Vec<(f64, f64)> = xs
            .iter()
            .flat_map(|&x| ys.iter().map(move |&y| (x, y)))
            .collect();

        let columns: Vec<Vec<Option<f64>>> = attributes
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let samples = points.iter().filter_map(|p| {
                    p.measure(name)
                        .and_then(|m| m.as_f64())
                        .map(|v| (p.location.x(), p.location.y(), v))
                });
                let interpolator = LinearInterpolator::new(samples);
                let values = interpolator.values_at(positions.iter().copied());
                debug!(
                    "Attribute '{}': {} samples, {} of {} nodes defined",
                    name,
                    interpolator.num_samples(),
                    values.iter().filter(|v| v.is_some()).count(),
                    values.len()
                );
                values
            })
            .collect();

        let nodes = positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| SurfaceNode {
                location: (x, y).into(),
                values: columns.iter().map(|column| column[i]).collect(),
            })
            .collect();

        Ok(InterpolatedSurface {
            crs: points.crs,
            bounds,
            steps: self.steps,
            attributes: attributes.iter().map(|a| a.as_ref().to_string()).collect(),
            nodes,
        })
    }
}

/// Interpolate `selected_measures` onto the default 500x500 lattice.
pub fn interpolate_point_measures<S: AsRef<str>>(
    points: &PointCollection,
    selected_measures: &[S],
) -> PraxisResult<InterpolatedSurface> {
    SurfaceInterpolator::new(&InterpolationConfig::default())?.interpolate(points, selected_measures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Measure, MeasuredPoint};
    use crate::projection::Crs;

    fn interpolator(steps: usize) -> SurfaceInterpolator {
        SurfaceInterpolator::new(&InterpolationConfig { steps }).unwrap()
    }

    fn triangle() -> PointCollection {
        PointCollection::from_points(
            Crs::Wgs84,
            vec![
                MeasuredPoint::new(0.0, 0.0).with_measure("temp", 10.0),
                MeasuredPoint::new(1.0, 0.0).with_measure("temp", 20.0),
                MeasuredPoint::new(0.0, 1.0).with_measure("temp", 30.0),
            ],
        )
    }

    #[test]
    fn test_lattice_axis() {
        assert_eq!(lattice_axis(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert_eq!(lattice_axis(2.0, 2.0, 2), vec![2.0, 2.0]);
        let axis = lattice_axis(-3.7, 11.1, 500);
        assert_eq!(axis.len(), 500);
        assert_eq!(axis[0], -3.7);
        assert_eq!(axis[499], 11.1);
    }

    #[test]
    fn test_three_point_scenario() {
        let surface = interpolator(3).interpolate(&triangle(), &["temp"]).unwrap();
        assert_eq!(surface.len(), 9);
        assert_eq!(surface.crs, Crs::Wgs84);

        let mid = surface.value(1, 0, "temp").unwrap();
        assert!((mid - 15.0).abs() < 1e-9);
        // (1, 1) lies outside the hull
        assert_eq!(surface.value(2, 2, "temp"), None);
    }

    #[test]
    fn test_node_order_x_slowest() {
        let surface = interpolator(3).interpolate(&triangle(), &["temp"]).unwrap();
        let first = surface.nodes[0].location;
        let second = surface.nodes[1].location;
        assert_eq!((first.x(), first.y()), (0.0, 0.0));
        assert_eq!((second.x(), second.y()), (0.0, 0.5));
        let n = surface.node(1, 2).unwrap().location;
        assert_eq!((n.x(), n.y()), (0.5, 1.0));
    }

    #[test]
    fn test_exact_at_coincident_nodes() {
        let points = PointCollection::from_points(
            Crs::Wgs84,
            vec![
                MeasuredPoint::new(0.0, 0.0).with_measure("ph", 5.0),
                MeasuredPoint::new(4.0, 0.0).with_measure("ph", 6.0),
                MeasuredPoint::new(4.0, 4.0).with_measure("ph", 7.5),
                MeasuredPoint::new(0.0, 4.0).with_measure("ph", 6.2),
                MeasuredPoint::new(2.0, 2.0).with_measure("ph", 9.0),
            ],
        );
        let surface = interpolator(5).interpolate(&points, &["ph"]).unwrap();
        assert_eq!(surface.value(0, 0, "ph"), Some(5.0));
        assert_eq!(surface.value(4, 0, "ph"), Some(6.0));
        assert_eq!(surface.value(4, 4, "ph"), Some(7.5));
        assert_eq!(surface.value(0, 4, "ph"), Some(6.2));
        assert_eq!(surface.value(2, 2, "ph"), Some(9.0));
        assert_eq!(surface.defined_count("ph"), 25);
    }

    #[test]
    fn test_missing_attribute() {
        let result = interpolator(3).interpolate(&triangle(), &["temp", "pressure"]);
        assert!(matches!(result, Err(PraxisError::MissingAttribute(_))));
    }

    #[test]
    fn test_empty_collection() {
        let empty = PointCollection::new(Crs::Wgs84);
        let result = interpolate_point_measures(&empty, &["temp"]);
        assert!(matches!(result, Err(PraxisError::InsufficientData(_))));
    }

    #[test]
    fn test_degenerate_input_is_all_undefined() {
        let points = PointCollection::from_points(
            Crs::Wgs84,
            vec![
                MeasuredPoint::new(0.0, 0.0).with_measure("temp", 1.0),
                MeasuredPoint::new(1.0, 1.0).with_measure("temp", 2.0),
            ],
        );
        let surface = interpolator(4).interpolate(&points, &["temp"]).unwrap();
        assert_eq!(surface.len(), 16);
        assert_eq!(surface.defined_count("temp"), 0);
    }

    #[test]
    fn test_attributes_are_independent() {
        let points = PointCollection::from_points(
            Crs::Wgs84,
            vec![
                MeasuredPoint::new(0.0, 0.0)
                    .with_measure("a", 1.0)
                    .with_measure("b", f64::NAN),
                MeasuredPoint::new(2.0, 0.0)
                    .with_measure("a", 3.0)
                    .with_measure("b", 10.0),
                MeasuredPoint::new(0.0, 2.0)
                    .with_measure("a", 5.0)
                    .with_measure("b", 20.0),
                MeasuredPoint::new(2.0, 2.0)
                    .with_measure("a", 7.0)
                    .with_measure("b", Measure::Missing),
            ],
        );
        let surface = interpolator(3).interpolate(&points, &["a", "b"]).unwrap();

        // "a" has all four samples and covers the whole box
        assert_eq!(surface.defined_count("a"), 9);
        let centre = surface.value(1, 1, "a").unwrap();
        assert!((centre - 4.0).abs() < 1e-9);

        // "b" keeps only two usable samples, too few for a triangle
        assert_eq!(surface.defined_count("b"), 0);
    }

    #[test]
    fn test_categorical_attribute_yields_no_data() {
        let mut points = triangle();
        for p in &mut points.points {
            p.measures
                .insert("texture".into(), Measure::Categorical("loam".into()));
        }
        let surface = interpolator(3)
            .interpolate(&points, &["temp", "texture"])
            .unwrap();
        assert_eq!(surface.defined_count("texture"), 0);
        assert!(surface.defined_count("temp") > 0);
    }

    #[test]
    fn test_default_steps() {
        let surface = interpolate_point_measures(&triangle(), &["temp"]).unwrap();
        assert_eq!(surface.steps, 500);
        assert_eq!(surface.len(), 500 * 500);
    }

    #[test]
    fn test_rejects_single_step() {
        assert!(matches!(
            SurfaceInterpolator::new(&InterpolationConfig { steps: 1 }),
            Err(PraxisError::InvalidInput(_))
        ));
    }
}
