//! Polygon sampling tool.
//!
//! Reads a single-polygon GeoJSON, generates lattice points inside it and
//! optionally queries soil properties for every point.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use praxis::config::Config;
use praxis::formats::{read_geometries, write_points, write_points_geojson};
use praxis::grid::{single_polygon, BoundaryPolicy, GridGenerator};
use praxis::models::PointCollection;
use praxis::soilgrid::{format_soilgrid_response, get_all_soilgrid_for_points, SoilGridClient};

#[derive(Parser, Debug)]
#[command(name = "sample")]
#[command(about = "Generate sample points inside a polygon and fetch soil data for them")]
struct Args {
    /// GeoJSON file holding exactly one polygon (EPSG:4326)
    #[arg(short, long)]
    polygon: PathBuf,

    /// Grid spacing in metres (overrides the config file)
    #[arg(short, long)]
    resolution: Option<f64>,

    /// Keep lattice nodes lying on the polygon edge
    #[arg(long)]
    inclusive: bool,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Query the soil API for every generated point
    #[arg(long)]
    fetch: bool,

    /// Output file (.csv or .geojson); GeoJSON on stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn write_output(points: &PointCollection, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let writer = BufWriter::new(file);
            if path.extension().map_or(false, |e| e == "csv") {
                write_points(writer, points)?;
            } else {
                write_points_geojson(writer, points)?;
            }
            info!("Wrote {} points to {}", points.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_points_geojson(&mut lock, points)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, so GeoJSON on stdout stays clean)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(resolution) = args.resolution {
        config.grid.resolution_m = resolution;
    }
    if args.inclusive {
        config.grid.boundary = BoundaryPolicy::Inclusive;
    }
    config.validate()?;

    info!("Praxis polygon sampling");
    info!("Polygon: {}", args.polygon.display());

    let geometries = read_geometries(&args.polygon)?;
    let polygon = single_polygon(&geometries)?;

    let generator = GridGenerator::new(&config.grid)?;
    let grid = generator.generate(polygon);

    let points = if args.fetch {
        let client = SoilGridClient::new(&config.soilgrid)?;
        let responses = get_all_soilgrid_for_points(&client, &grid).await?;
        format_soilgrid_response(&responses)?
    } else {
        grid
    };

    write_output(&points, args.output.as_deref())
}
