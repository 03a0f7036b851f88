use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum FeatureError {
    #[error("Insufficient data: {candles} candles, need more than {required}")]
    InsufficientData { candles: usize, required: usize },

    #[error("Insufficient data for {indicator}: {len} values, need at least {required}")]
    InsufficientDataForIndicator {
        indicator: &'static str,
        len: usize,
        required: usize,
    },

    #[error("Value {value} of {field} at index {index} is outside [{from}, {to}]")]
    OutOfRange {
        field: String,
        index: usize,
        value: f64,
        from: f64,
        to: f64,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FeatureError>;
