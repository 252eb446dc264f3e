// src/error.rs

use thiserror::Error;

/// Invalid settings. Fatal for the call that received them, never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("unresolvable coordinate reference '{0}'")]
    UnresolvableCrs(String),
    #[error("coordinate reference '{0}' is not a planar metric frame")]
    NotMetric(String),
    #[error("distance threshold must be a positive number of meters, got {0}")]
    NonPositiveDistance(f64),
    #[error("similarity threshold must lie in [0, 1], got {0}")]
    SimilarityOutOfRange(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DedupError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("invalid coordinate (lon {lon}, lat {lat})")]
    InvalidCoordinate { lon: f64, lat: f64 },
    #[error("projection failed: {0}")]
    Projection(String),
}

pub type DedupResult<T> = std::result::Result<T, DedupError>;
