use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{require_finite, PraxisError, PraxisResult};
use crate::grid::BoundaryPolicy;
use crate::projection::Crs;

pub const DEFAULT_RESOLUTION_M: f64 = 250.0;
pub const DEFAULT_INTERPOLATION_STEPS: usize = 500;
pub const DEFAULT_SOILGRID_ENDPOINT: &str =
    "https://isqaper.isric.org/isqaper-rest/api/1.0/query";

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub interpolation: InterpolationConfig,
    pub soilgrid: SoilGridConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Lattice spacing in metres
    pub resolution_m: f64,
    pub boundary: BoundaryPolicy,
    pub geographic_epsg: u32,
    pub planar_epsg: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution_m: DEFAULT_RESOLUTION_M,
            boundary: BoundaryPolicy::default(),
            geographic_epsg: Crs::Wgs84.epsg(),
            planar_epsg: Crs::WebMercator.epsg(),
        }
    }
}

impl GridConfig {
    pub fn geographic_crs(&self) -> PraxisResult<Crs> {
        let crs = Crs::from_epsg(self.geographic_epsg)?;
        if !crs.is_geographic() {
            return Err(PraxisError::InvalidInput(format!(
                "geographic_epsg must name a geographic frame, got {crs}"
            )));
        }
        Ok(crs)
    }

    pub fn planar_crs(&self) -> PraxisResult<Crs> {
        let crs = Crs::from_epsg(self.planar_epsg)?;
        if crs.is_geographic() {
            return Err(PraxisError::InvalidInput(format!(
                "planar_epsg must name a projected frame, got {crs}"
            )));
        }
        Ok(crs)
    }

    pub fn validate(&self) -> PraxisResult<()> {
        require_finite(self.resolution_m, "resolution_m")?;
        self.geographic_crs()?;
        self.planar_crs()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Lattice nodes per axis, bounding box corners included
    pub steps: usize,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_INTERPOLATION_STEPS,
        }
    }
}

impl InterpolationConfig {
    pub fn validate(&self) -> PraxisResult<()> {
        if self.steps < 2 {
            return Err(PraxisError::InvalidInput(format!(
                "interpolation steps must be at least 2, got {}",
                self.steps
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SoilGridConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SoilGridConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SOILGRID_ENDPOINT.to_string(),
            timeout_secs: 60,
            user_agent: format!("praxis/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PraxisResult<()> {
        self.grid.validate()?;
        self.interpolation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.grid.resolution_m, 250.0);
        assert_eq!(config.grid.boundary, BoundaryPolicy::Exclusive);
        assert_eq!(config.grid.geographic_epsg, 4326);
        assert_eq!(config.grid.planar_epsg, 3857);
        assert_eq!(config.interpolation.steps, 500);
        assert_eq!(config.soilgrid.endpoint, DEFAULT_SOILGRID_ENDPOINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[grid]\nresolution_m = 100.0\nboundary = \"inclusive\"\n\n[interpolation]\nsteps = 50"
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.grid.resolution_m, 100.0);
        assert_eq!(config.grid.boundary, BoundaryPolicy::Inclusive);
        assert_eq!(config.grid.planar_epsg, 3857);
        assert_eq!(config.interpolation.steps, 50);
        assert_eq!(config.soilgrid.timeout_secs, 60);
    }

    #[test]
    fn test_rejects_small_steps() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[interpolation]\nsteps = 1").unwrap();
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_rejects_swapped_frames() {
        let grid = GridConfig {
            geographic_epsg: 3857,
            planar_epsg: 4326,
            ..GridConfig::default()
        };
        assert!(matches!(
            grid.validate(),
            Err(PraxisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load_from_file("/nonexistent/praxis.toml").is_err());
    }
}
