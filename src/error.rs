use thiserror::Error;

/// Failures while loading or validating a scan geometry configuration.
/// All of these are fatal before any frame processing starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid radii: start {start} must be non-negative and smaller than end {end}")]
    InvalidRadii { start: f64, end: f64 },

    #[error("invalid angles: min {min} must be smaller than max {max}")]
    InvalidAngles { min: f64, max: f64 },

    #[error("curvilinear image size must be positive")]
    ZeroImageSize,

    #[error("sampling grid is empty: {num_lines} lines x {num_samples} samples")]
    EmptyGrid { num_lines: usize, num_samples: usize },
}

/// Failures during scan conversion of a frame.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("frame shape {got:?} does not match the expected linear shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("degenerate sampling geometry: {0}")]
    DegenerateGeometry(String),
}
