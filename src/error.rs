// src/error.rs

use thiserror::Error;

/// Rejected configuration values. Every check happens up front in
/// `Config::validate` or in a sampler constructor, before the run starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("order mix weights must sum to 1 (got {sum})")]
    WeightSum { sum: f64 },

    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },

    #[error("record_interval ({record_interval}) must be at least dt ({dt})")]
    RecordIntervalTooSmall { record_interval: f64, dt: f64 },

    #[error("min_size must be at least 1")]
    ZeroMinSize,

    #[error("max_size ({max_size}) must be at least min_size ({min_size})")]
    SizeBounds { min_size: u64, max_size: u64 },

    #[error("p_geom must be in (0, 1] (got {0})")]
    GeometricP(f64),

    #[error("r_pointmass must be in [0, 1] (got {0})")]
    PointMass(f64),

    #[error("alpha_zipf must be greater than 1 (got {0})")]
    ZipfExponent(f64),

    #[error("max_distance must be at least 1")]
    ZeroMaxDistance,

    #[error("twap intervals must be at least 1")]
    ZeroIntervals,

    #[error("invalid distribution parameters: {0}")]
    Distribution(String),
}

/// Boundary errors surfaced to the entry point. The per-tick core never
/// raises; only configuration loading and the CSV/log sinks can fail.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
