use thiserror::Error;

/// Configuration rejected before the tick loop starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("particle capacity must be at least 1")]
    ZeroCapacity,
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("simulation bounds are inverted or empty: min {min:?}, max {max:?}")]
    DegenerateBounds { min: [f32; 2], max: [f32; 2] },
    #[error("bounds of size {size:?} hold no grid cells of size {cell_size}")]
    EmptyGrid { size: [f32; 2], cell_size: f32 },
}

pub(crate) fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

pub(crate) fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}
