use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2, Triangulation};
use tracing::warn;

/// A triangulation vertex carrying the sampled value
#[derive(Debug, Clone, Copy)]
struct Sample {
    position: Point2<f64>,
    value: f64,
}

impl HasPosition for Sample {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Piecewise-linear interpolant over one attribute's samples
pub struct LinearInterpolator {
    triangulation: Option<DelaunayTriangulation<Sample>>,
}

impl LinearInterpolator {
    /// Build from `(x, y, value)` samples.
    ///
    /// Samples with a non-finite coordinate or value are skipped. With fewer
    /// than three non-collinear samples the interpolant is undefined
    /// everywhere.
    pub fn new<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64, f64)>,
    {
        let vertices: Vec<Sample> = samples
            .into_iter()
            .filter(|(x, y, v)| x.is_finite() && y.is_finite() && v.is_finite())
            .map(|(x, y, value)| Sample {
                position: Point2::new(x, y),
                value,
            })
            .collect();

        let count = vertices.len();
        let triangulation = match DelaunayTriangulation::<Sample>::bulk_load_stable(vertices) {
            Ok(dt) => dt,
            Err(e) => {
                warn!("Failed to triangulate {} samples: {:?}", count, e);
                return Self {
                    triangulation: None,
                };
            }
        };

        if triangulation.num_inner_faces() == 0 {
            warn!(
                "Degenerate triangulation ({} usable samples, no triangles)",
                count
            );
            return Self {
                triangulation: None,
            };
        }

        Self {
            triangulation: Some(triangulation),
        }
    }

    /// True when at least one triangle exists.
    pub fn is_defined(&self) -> bool {
        self.triangulation.is_some()
    }

    pub fn num_samples(&self) -> usize {
        self.triangulation
            .as_ref()
            .map(|dt| dt.num_vertices())
            .unwrap_or(0)
    }

    /// Estimate at `(x, y)`, `None` outside the convex hull of the samples.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let dt = self.triangulation.as_ref()?;
        dt.barycentric()
            .interpolate(|v| v.data().value, Point2::new(x, y))
    }

    /// Estimates for many positions, reusing one weight buffer.
    pub fn values_at<I>(&self, positions: I) -> Vec<Option<f64>>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        match self.triangulation.as_ref() {
            Some(dt) => {
                let barycentric = dt.barycentric();
                positions
                    .into_iter()
                    .map(|(x, y)| barycentric.interpolate(|v| v.data().value, Point2::new(x, y)))
                    .collect()
            }
            None => positions.into_iter().map(|_| None).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a value");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_three_point_scenario() {
        let interp = LinearInterpolator::new(vec![
            (0.0, 0.0, 10.0),
            (1.0, 0.0, 20.0),
            (0.0, 1.0, 30.0),
        ]);
        assert!(interp.is_defined());
        assert_close(interp.value_at(0.5, 0.0), 15.0);
        assert_close(interp.value_at(0.0, 0.5), 20.0);
        assert_eq!(interp.value_at(2.0, 2.0), None);
    }

    #[test]
    fn test_exact_at_samples() {
        let samples = vec![
            (0.0, 0.0, 1.5),
            (4.0, 0.0, -2.0),
            (4.0, 3.0, 7.25),
            (0.0, 3.0, 3.0),
            (2.0, 1.0, 11.0),
        ];
        let interp = LinearInterpolator::new(samples.clone());
        for (x, y, v) in samples {
            assert_close(interp.value_at(x, y), v);
        }
    }

    #[test]
    fn test_linear_field_is_reproduced() {
        // f(x, y) = 2x + 3y + 1 is reproduced exactly inside the hull
        let f = |x: f64, y: f64| 2.0 * x + 3.0 * y + 1.0;
        let samples: Vec<_> = [(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0), (2.5, 1.0)]
            .iter()
            .map(|&(x, y)| (x, y, f(x, y)))
            .collect();
        let interp = LinearInterpolator::new(samples);
        for &(x, y) in &[(1.0, 1.0), (3.3, 4.1), (4.9, 0.2)] {
            assert_close(interp.value_at(x, y), f(x, y));
        }
    }

    #[test]
    fn test_values_at_matches_value_at() {
        let interp = LinearInterpolator::new(vec![
            (0.0, 0.0, 10.0),
            (1.0, 0.0, 20.0),
            (0.0, 1.0, 30.0),
        ]);
        let positions = vec![(0.25, 0.25), (0.5, 0.0), (3.0, 3.0)];
        let batch = interp.values_at(positions.clone());
        for ((x, y), value) in positions.into_iter().zip(batch) {
            assert_eq!(value, interp.value_at(x, y));
        }
    }

    #[test]
    fn test_collinear_is_undefined() {
        let interp = LinearInterpolator::new(vec![
            (0.0, 0.0, 1.0),
            (1.0, 1.0, 2.0),
            (2.0, 2.0, 3.0),
        ]);
        assert!(!interp.is_defined());
        assert_eq!(interp.value_at(1.0, 1.0), None);
    }

    #[test]
    fn test_too_few_samples() {
        assert!(!LinearInterpolator::new(Vec::new()).is_defined());
        assert!(!LinearInterpolator::new(vec![(0.0, 0.0, 1.0), (1.0, 0.0, 2.0)]).is_defined());
    }

    #[test]
    fn test_nan_samples_are_skipped() {
        let interp = LinearInterpolator::new(vec![
            (0.0, 0.0, 10.0),
            (1.0, 0.0, 20.0),
            (0.0, 1.0, 30.0),
            (0.2, 0.2, f64::NAN),
        ]);
        assert_eq!(interp.num_samples(), 3);
        assert_close(interp.value_at(0.5, 0.0), 15.0);
    }
}
