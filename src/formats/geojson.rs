//! Minimal GeoJSON reading (polygon layers) and writing (point layers).

use anyhow::{Context, Result};
use geo::{Coord, Geometry, LineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{PraxisError, PraxisResult};
use crate::models::{Measure, PointCollection};

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryJson {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

fn to_coord(position: &[f64]) -> PraxisResult<Coord<f64>> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(PraxisError::InvalidInput(format!(
            "position needs at least 2 values, got {}",
            position.len()
        ))),
    }
}

fn to_line_string(ring: &[Position]) -> PraxisResult<LineString<f64>> {
    ring.iter()
        .map(|p| to_coord(p))
        .collect::<PraxisResult<Vec<_>>>()
        .map(LineString::new)
}

fn to_polygon(rings: &[Vec<Position>]) -> PraxisResult<Polygon<f64>> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| PraxisError::InvalidInput("polygon has no rings".into()))?;
    Ok(Polygon::new(
        to_line_string(exterior)?,
        interiors
            .iter()
            .map(|r| to_line_string(r))
            .collect::<PraxisResult<Vec<_>>>()?,
    ))
}

impl GeometryJson {
    fn to_geometry(&self) -> PraxisResult<Geometry<f64>> {
        Ok(match self {
            GeometryJson::Point { coordinates } => Geometry::Point(Point(to_coord(coordinates)?)),
            GeometryJson::MultiPoint { coordinates } => Geometry::MultiPoint(MultiPoint::new(
                coordinates
                    .iter()
                    .map(|p| to_coord(p).map(Point))
                    .collect::<PraxisResult<Vec<_>>>()?,
            )),
            GeometryJson::LineString { coordinates } => {
                Geometry::LineString(to_line_string(coordinates)?)
            }
            GeometryJson::Polygon { coordinates } => Geometry::Polygon(to_polygon(coordinates)?),
            GeometryJson::MultiPolygon { coordinates } => Geometry::MultiPolygon(MultiPolygon::new(
                coordinates
                    .iter()
                    .map(|p| to_polygon(p))
                    .collect::<PraxisResult<Vec<_>>>()?,
            )),
        })
    }
}

fn parse_geometry(value: &Value) -> PraxisResult<Geometry<f64>> {
    let geometry: GeometryJson = serde_json::from_value(value.clone())
        .map_err(|e| PraxisError::InvalidInput(format!("unsupported geometry: {e}")))?;
    geometry.to_geometry()
}

fn feature_geometry(feature: &Value) -> PraxisResult<Option<Geometry<f64>>> {
    match feature.get("geometry") {
        None | Some(Value::Null) => Ok(None),
        Some(g) => parse_geometry(g).map(Some),
    }
}

/// Geometries of a FeatureCollection, a single Feature or a bare geometry.
/// Features without geometry are skipped.
pub fn parse_geometries(raw: &str) -> PraxisResult<Vec<Geometry<f64>>> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| PraxisError::InvalidInput(format!("invalid GeoJSON: {e}")))?;

    match doc.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let features = doc
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| PraxisError::InvalidInput("FeatureCollection without features".into()))?;
            let mut geometries = Vec::with_capacity(features.len());
            for feature in features {
                if let Some(g) = feature_geometry(feature)? {
                    geometries.push(g);
                }
            }
            Ok(geometries)
        }
        Some("Feature") => Ok(feature_geometry(&doc)?.into_iter().collect()),
        Some(_) => Ok(vec![parse_geometry(&doc)?]),
        None => Err(PraxisError::InvalidInput(
            "GeoJSON document has no type".into(),
        )),
    }
}

pub fn read_geometries<P: AsRef<Path>>(path: P) -> Result<Vec<Geometry<f64>>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_geometries(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn measure_value(measure: &Measure) -> Value {
    match measure {
        Measure::Numeric(v) => json!(v),
        Measure::Categorical(s) => json!(s),
        Measure::Missing => Value::Null,
    }
}

/// Write a point collection as a FeatureCollection with measures as properties.
pub fn write_points_geojson<W: Write>(writer: W, points: &PointCollection) -> Result<()> {
    let features: Vec<Value> = points
        .iter()
        .map(|p| {
            let properties: Map<String, Value> = p
                .measures
                .iter()
                .map(|(k, v)| (k.clone(), measure_value(v)))
                .collect();
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [p.location.x(), p.location.y()],
                },
                "properties": properties,
            })
        })
        .collect();

    let doc = json!({
        "type": "FeatureCollection",
        "crs": {
            "type": "name",
            "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", points.crs.epsg()) },
        },
        "features": features,
    });

    serde_json::to_writer_pretty(writer, &doc).context("Failed to write GeoJSON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeasuredPoint;
    use crate::projection::Crs;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "field"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
            }
        }]
    }"#;

    #[test]
    fn test_feature_collection() {
        let geometries = parse_geometries(SQUARE).unwrap();
        assert_eq!(geometries.len(), 1);
        match &geometries[0] {
            Geometry::Polygon(p) => {
                assert_eq!(p.exterior().0.len(), 5);
                assert!(p.interiors().is_empty());
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_geometry_and_feature() {
        let bare = r#"{"type": "MultiPolygon", "coordinates": [[[[0,0],[1,0],[1,1],[0,0]]]]}"#;
        assert!(matches!(
            parse_geometries(bare).unwrap().as_slice(),
            [Geometry::MultiPolygon(_)]
        ));

        let feature = r#"{"type": "Feature", "geometry": null, "properties": {}}"#;
        assert!(parse_geometries(feature).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_positions() {
        let raw = r#"{"type": "Polygon", "coordinates": [[[0], [1, 0], [0, 0]]]}"#;
        assert!(matches!(
            parse_geometries(raw),
            Err(PraxisError::InvalidInput(_))
        ));
        assert!(parse_geometries("{}").is_err());
    }

    #[test]
    fn test_write_points() {
        let points = PointCollection::from_points(
            Crs::Wgs84,
            vec![MeasuredPoint::new(1.5, 2.5)
                .with_measure("ph", 6.0)
                .with_measure("class", Measure::Categorical("loam".into()))],
        );
        let mut buf = Vec::new();
        write_points_geojson(&mut buf, &points).unwrap();

        let doc: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["features"][0]["geometry"]["coordinates"][0], 1.5);
        assert_eq!(doc["features"][0]["properties"]["ph"], 6.0);
        assert_eq!(doc["features"][0]["properties"]["class"], "loam");
        assert_eq!(
            doc["crs"]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::4326"
        );

        // Written points read back as geometries
        let raw = String::from_utf8(buf).unwrap();
        assert!(matches!(
            parse_geometries(&raw).unwrap().as_slice(),
            [Geometry::Point(_)]
        ));
    }
}
