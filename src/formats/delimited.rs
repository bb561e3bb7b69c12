//! CSV point tables and surface grids.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use crate::models::{InterpolatedSurface, Measure, MeasuredPoint, PointCollection};
use crate::projection::Crs;

const X_COLUMNS: &[&str] = &["lon", "longitude", "x"];
const Y_COLUMNS: &[&str] = &["lat", "latitude", "y"];

fn axis_names(crs: Crs) -> (&'static str, &'static str) {
    if crs.is_geographic() {
        ("lon", "lat")
    } else {
        ("x", "y")
    }
}

/// Load a point table; `.gz` files are decompressed on the fly.
pub fn read_points(path: &Path, crs: Crs) -> Result<PointCollection> {
    info!("Loading points from {}", path.display());

    let file = File::open(path).context("Failed to open points file")?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let points = parse_points(reader, crs)?;
    info!("Loaded {} points", points.len());
    Ok(points)
}

/// Parse a CSV with a header row. The longitude/latitude (or x/y) columns
/// locate each point; every other column becomes a measure.
pub fn parse_points<R: Read>(reader: R, crs: Crs) -> Result<PointCollection> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let find = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };
    let x_idx = find(X_COLUMNS).context("No longitude/x column found")?;
    let y_idx = find(Y_COLUMNS).context("No latitude/y column found")?;

    let mut points = PointCollection::new(crs);
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        let parse_axis = |idx: usize| -> Result<f64> {
            record[idx]
                .parse::<f64>()
                .with_context(|| format!("Row {}: invalid coordinate '{}'", row + 1, &record[idx]))
        };

        let mut point = MeasuredPoint::new(parse_axis(x_idx)?, parse_axis(y_idx)?);
        for (idx, name) in headers.iter().enumerate() {
            if idx == x_idx || idx == y_idx {
                continue;
            }
            let cell = record.get(idx).unwrap_or("");
            point.measures.insert(name.to_string(), Measure::parse(cell));
        }
        points.push(point);
    }

    Ok(points)
}

pub fn write_points<W: Write>(writer: W, points: &PointCollection) -> Result<()> {
    let schema = points.schema();
    let (x_name, y_name) = axis_names(points.crs);

    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    let mut header = vec![x_name.to_string(), y_name.to_string()];
    header.extend(schema.iter().cloned());
    csv_writer.write_record(&header)?;

    for point in points.iter() {
        let mut record = vec![point.location.x().to_string(), point.location.y().to_string()];
        record.extend(schema.iter().map(|name| {
            point
                .measure(name)
                .map(|m| m.to_string())
                .unwrap_or_default()
        }));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// One row per lattice node; no-data cells are left empty.
pub fn write_surface<W: Write>(writer: W, surface: &InterpolatedSurface) -> Result<()> {
    let (x_name, y_name) = axis_names(surface.crs);

    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    let mut header = vec![x_name.to_string(), y_name.to_string()];
    header.extend(surface.attributes.iter().cloned());
    csv_writer.write_record(&header)?;

    for node in &surface.nodes {
        let mut record = vec![node.location.x().to_string(), node.location.y().to_string()];
        record.extend(
            node.values
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
