//! Surface interpolation tool.
//!
//! Reads a CSV of measured points and writes the interpolated lattice as CSV.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use praxis::config::Config;
use praxis::formats::{read_points, write_surface};
use praxis::interpolate::SurfaceInterpolator;
use praxis::projection::Crs;

#[derive(Parser, Debug)]
#[command(name = "surface")]
#[command(about = "Interpolate point measures onto a regular grid")]
struct Args {
    /// CSV with lon/lat (or x/y) columns plus one column per measure; .gz accepted
    #[arg(short, long)]
    input: PathBuf,

    /// Measures to interpolate (repeat or comma-separate)
    #[arg(short, long, value_delimiter = ',', required = true)]
    measures: Vec<String>,

    /// Lattice nodes per axis (overrides the config file)
    #[arg(long)]
    steps: Option<usize>,

    /// EPSG code of the input coordinates
    #[arg(long, default_value = "4326")]
    epsg: u32,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output CSV; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(steps) = args.steps {
        config.interpolation.steps = steps;
    }

    info!("Praxis surface interpolation");

    let crs = Crs::from_epsg(args.epsg)?;
    let points = read_points(&args.input, crs)?;

    let interpolator = SurfaceInterpolator::new(&config.interpolation)?;
    let surface = interpolator.interpolate(&points, &args.measures)?;

    for name in &surface.attributes {
        info!(
            "{}: {} of {} nodes defined",
            name,
            surface.defined_count(name),
            surface.len()
        );
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_surface(BufWriter::new(file), &surface)?;
            info!("Wrote surface to {}", path.display());
        }
        None => write_surface(io::stdout().lock(), &surface)?,
    }

    Ok(())
}
