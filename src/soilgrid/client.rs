use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::SoilGridResponse;
use crate::config::SoilGridConfig;
use crate::models::PointCollection;

/// HTTP client for the soil property query endpoint
pub struct SoilGridClient {
    client: Client,
    endpoint: Url,
}

impl SoilGridClient {
    pub fn new(config: &SoilGridConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("Invalid soil API endpoint '{}'", config.endpoint))?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Query URL for one coordinate
    pub fn query_url(&self, lon: f64, lat: f64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("lon", &lon.to_string())
            .append_pair("lat", &lat.to_string());
        url
    }

    /// Fetch the property document for one coordinate.
    ///
    /// A non-success status is logged and yields `None`; transport and
    /// decoding failures are returned as errors.
    pub async fn fetch_point(&self, lon: f64, lat: f64) -> Result<Option<SoilGridResponse>> {
        let url = self.query_url(lon, lat);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Soil API request failed for ({}, {})", lon, lat))?;

        if !response.status().is_success() {
            warn!(
                "Soil API returned {} for ({}, {}), skipping point",
                response.status(),
                lon,
                lat
            );
            return Ok(None);
        }

        let data: SoilGridResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to decode soil API response for ({}, {})", lon, lat))?;
        Ok(Some(data))
    }
}

/// Query every point in order, keeping only successful responses.
pub async fn get_all_soilgrid_for_points(
    client: &SoilGridClient,
    points: &PointCollection,
) -> Result<Vec<SoilGridResponse>> {
    if !points.crs.is_geographic() {
        anyhow::bail!("Soil API expects geographic coordinates, got {}", points.crs);
    }

    info!(
        "Querying {} for {} points...",
        client.endpoint(),
        points.len()
    );

    let pb = ProgressBar::new(points.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut responses = Vec::with_capacity(points.len());
    for point in points.iter() {
        let (lon, lat) = (point.location.x(), point.location.y());
        if let Some(response) = client.fetch_point(lon, lat).await? {
            responses.push(response);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let skipped = points.len() - responses.len();
    if skipped > 0 {
        warn!("{} of {} points returned no data", skipped, points.len());
    }
    info!("Fetched soil properties for {} points", responses.len());

    Ok(responses)
}
