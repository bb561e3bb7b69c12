//! Error taxonomy shared by the grid, interpolation and flattening stages.

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PraxisError {
    /// Malformed, absent or multi-valued geometry, or an invalid parameter.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Not enough points to derive a bounding box.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    /// A requested attribute is not part of the input schema.
    #[error("missing attribute: {0}")]
    MissingAttribute(String),
    /// A remote response did not have the expected leaf/branch shape.
    #[error("unexpected response schema: {0}")]
    Schema(String),
}

pub type PraxisResult<T> = Result<T, PraxisError>;

pub fn require_finite(value: f64, name: &str) -> PraxisResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PraxisError::InvalidInput(format!("{name} must be finite")))
    }
}
