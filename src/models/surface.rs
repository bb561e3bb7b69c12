//! Gridded output of the surface interpolator.

use geo::Rect;
use geo_types::Point;

use crate::projection::Crs;

/// One lattice node with a value per requested attribute.
///
/// `values[i]` belongs to `InterpolatedSurface::attributes[i]`; `None` marks
/// a node where no value could be produced (outside the convex hull of the
/// samples, or a degenerate triangulation).
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceNode {
    pub location: Point<f64>,
    pub values: Vec<Option<f64>>,
}

/// Regular lattice spanning the bounding box of the input points
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedSurface {
    pub crs: Crs,
    pub bounds: Rect<f64>,
    /// Nodes per axis, corners included
    pub steps: usize,
    pub attributes: Vec<String>,
    /// Column-major: x varies slowest, y fastest
    pub nodes: Vec<SurfaceNode>,
}

impl InterpolatedSurface {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at lattice index (`ix` along x, `iy` along y)
    pub fn node(&self, ix: usize, iy: usize) -> Option<&SurfaceNode> {
        if ix >= self.steps || iy >= self.steps {
            return None;
        }
        self.nodes.get(ix * self.steps + iy)
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == name)
    }

    /// Value of `attribute` at lattice index, `None` for no data or unknown attribute.
    pub fn value(&self, ix: usize, iy: usize, attribute: &str) -> Option<f64> {
        let idx = self.attribute_index(attribute)?;
        self.node(ix, iy)?.values.get(idx).copied().flatten()
    }

    /// Count of nodes carrying a value for `attribute`
    pub fn defined_count(&self, attribute: &str) -> usize {
        match self.attribute_index(attribute) {
            Some(idx) => self
                .nodes
                .iter()
                .filter(|n| n.values.get(idx).copied().flatten().is_some())
                .count(),
            None => 0,
        }
    }
}
