//! Soil property lookups from the ISRIC ISQAPER query API.
//!
//! The API answers one coordinate at a time with a nested GeoJSON document;
//! `format_soilgrid_response` flattens a batch of those into a point
//! collection with one measure per leaf property.

mod client;
mod response;

pub use client::{get_all_soilgrid_for_points, SoilGridClient};
pub use response::{format_soilgrid_response, PropertyLeaf, PropertyNode, SoilGridResponse};
