//! Error types for raster-coverage

use std::io;
use thiserror::Error;

/// Result type for raster-coverage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding inputs or running an analysis
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid TIFF format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Invalid TIFF magic number
    #[error("Invalid TIFF magic number: {0}")]
    InvalidMagic(u16),

    /// Missing required tag
    #[error("Missing required tag: {0}")]
    MissingTag(u16),

    /// Unsupported feature
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Out of bounds access
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// Projection setup or coordinate conversion failed
    #[error("Projection error: {0}")]
    Projection(String),

    /// A dataset without a coordinate reference system was asked to reproject
    #[error("cannot reproject {dataset}: no coordinate reference system declared")]
    MissingCrs {
        /// Which input lacked the CRS ("raster", "boundaries", ...)
        dataset: &'static str,
    },

    /// Boundary dataset could not be used
    #[error("Boundary error: {0}")]
    Boundary(String),

    /// GeoJSON parse error
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Boundary download failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV export failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON export failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Bad configuration or file selection
    #[error("Configuration error: {0}")]
    Config(String),
}
