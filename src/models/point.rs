//! Point collections with optional per-point measures.

use geo::{BoundingRect, MultiPoint, Rect};
use geo_types::Point;
use hashbrown::HashSet;
use std::collections::BTreeMap;

use crate::error::{PraxisError, PraxisResult};
use crate::projection::Crs;

/// A single attribute value attached to a point
#[derive(Debug, Clone, PartialEq)]
pub enum Measure {
    Numeric(f64),
    /// Categorical fields (e.g. depth classes) that cannot be interpolated
    Categorical(String),
    Missing,
}

impl Measure {
    /// Numeric value, or `None` for missing, categorical and NaN values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Measure::Numeric(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Parse a textual cell: empty is missing, numbers are numeric, the rest categorical.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Measure::Missing;
        }
        match raw.parse::<f64>() {
            Ok(v) => Measure::Numeric(v),
            Err(_) => Measure::Categorical(raw.to_string()),
        }
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Measure::Numeric(v) => write!(f, "{}", v),
            Measure::Categorical(s) => write!(f, "{}", s),
            Measure::Missing => Ok(()),
        }
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Measure::Numeric(value)
    }
}

/// A location plus its named measures
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredPoint {
    pub location: Point<f64>,
    pub measures: BTreeMap<String, Measure>,
}

impl MeasuredPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            location: Point::new(x, y),
            measures: BTreeMap::new(),
        }
    }

    pub fn with_measure(mut self, name: &str, value: impl Into<Measure>) -> Self {
        self.measures.insert(name.to_string(), value.into());
        self
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.get(name)
    }
}

/// Ordered set of points sharing one reference frame
#[derive(Debug, Clone, PartialEq)]
pub struct PointCollection {
    pub crs: Crs,
    pub points: Vec<MeasuredPoint>,
}

impl PointCollection {
    pub fn new(crs: Crs) -> Self {
        Self {
            crs,
            points: Vec::new(),
        }
    }

    pub fn from_points(crs: Crs, points: Vec<MeasuredPoint>) -> Self {
        Self { crs, points }
    }

    pub fn push(&mut self, point: MeasuredPoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasuredPoint> {
        self.points.iter()
    }

    /// All attribute names present on at least one point, sorted.
    pub fn schema(&self) -> Vec<String> {
        let names: HashSet<&str> = self
            .points
            .iter()
            .flat_map(|p| p.measures.keys().map(String::as_str))
            .collect();
        let mut names: Vec<String> = names.into_iter().map(str::to_string).collect();
        names.sort();
        names
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.points.iter().any(|p| p.measures.contains_key(name))
    }

    /// Bounding box of every point in the collection.
    pub fn bounds(&self) -> PraxisResult<Rect<f64>> {
        if let Some(bad) = self
            .points
            .iter()
            .find(|p| !p.location.x().is_finite() || !p.location.y().is_finite())
        {
            return Err(PraxisError::InvalidInput(format!(
                "non-finite coordinate ({}, {})",
                bad.location.x(),
                bad.location.y()
            )));
        }

        let multi: MultiPoint<f64> = self.points.iter().map(|p| p.location).collect();
        multi.bounding_rect().ok_or_else(|| {
            PraxisError::InsufficientData("cannot derive a bounding box from zero points".into())
        })
    }
}
