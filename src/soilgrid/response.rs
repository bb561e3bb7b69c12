use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{PraxisError, PraxisResult};
use crate::models::{Measure, MeasuredPoint, PointCollection};
use crate::projection::Crs;

/// Top-level API document (a GeoJSON feature collection)
#[derive(Debug, Clone, Deserialize)]
pub struct SoilGridResponse {
    pub features: Vec<SoilGridFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoilGridFeature {
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointGeometry {
    pub coordinates: Vec<f64>,
}

/// The API nests the property tree one level deeper than plain GeoJSON
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureProperties {
    pub properties: BTreeMap<String, PropertyNode>,
}

/// A property tree node: either a measured leaf or a group of sub-nodes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PropertyNode {
    Leaf(PropertyLeaf),
    Branch(BTreeMap<String, PropertyNode>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyLeaf {
    pub value: Value,
    pub metadata: LeafMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeafMetadata {
    pub short_description: String,
}

impl PropertyLeaf {
    fn measure(&self) -> PraxisResult<Measure> {
        match &self.value {
            Value::Null => Ok(Measure::Missing),
            Value::Number(n) => Ok(n
                .as_f64()
                .map(Measure::Numeric)
                .unwrap_or(Measure::Missing)),
            Value::String(s) => Ok(Measure::Categorical(s.clone())),
            Value::Bool(b) => Ok(Measure::Categorical(b.to_string())),
            Value::Array(_) | Value::Object(_) => Err(PraxisError::Schema(format!(
                "leaf '{}' holds a nested value",
                self.metadata.short_description
            ))),
        }
    }
}

impl PropertyNode {
    /// Collect every leaf below this node, keyed by its short description.
    fn collect_leaves(
        &self,
        path: &str,
        out: &mut BTreeMap<String, Measure>,
    ) -> PraxisResult<()> {
        match self {
            PropertyNode::Leaf(leaf) => {
                let label = leaf.metadata.short_description.clone();
                let measure = leaf.measure()?;
                if out.insert(label.clone(), measure).is_some() {
                    warn!("Duplicate property label '{}' at {}, keeping last", label, path);
                }
            }
            PropertyNode::Branch(children) => {
                for (name, child) in children {
                    child.collect_leaves(&format!("{path}/{name}"), out)?;
                }
            }
        }
        Ok(())
    }
}

impl SoilGridResponse {
    pub fn from_json(raw: &str) -> PraxisResult<Self> {
        serde_json::from_str(raw).map_err(|e| PraxisError::Schema(e.to_string()))
    }

    fn first_feature(&self) -> PraxisResult<&SoilGridFeature> {
        self.features
            .first()
            .ok_or_else(|| PraxisError::Schema("response has no features".into()))
    }

    /// Flatten the first feature into a measured point.
    pub fn to_point(&self) -> PraxisResult<MeasuredPoint> {
        let feature = self.first_feature()?;
        let (lon, lat) = match feature.geometry.coordinates.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            other => {
                return Err(PraxisError::Schema(format!(
                    "expected [lon, lat] coordinates, got {} values",
                    other.len()
                )))
            }
        };

        let mut point = MeasuredPoint::new(lon, lat);
        for (name, node) in &feature.properties.properties {
            node.collect_leaves(name, &mut point.measures)?;
        }
        Ok(point)
    }
}

/// Flatten API responses into one WGS 84 point per response.
pub fn format_soilgrid_response(responses: &[SoilGridResponse]) -> PraxisResult<PointCollection> {
    let points = responses
        .iter()
        .map(SoilGridResponse::to_point)
        .collect::<PraxisResult<Vec<_>>>()?;
    debug!("Flattened {} soil responses", points.len());
    Ok(PointCollection::from_points(Crs::Wgs84, points))
}
