//! YAML run configuration
//!
//! Every field is optional; missing ones take the tool's defaults. Values may
//! reference environment variables as `${VAR}` or `${VAR:-default}`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisParams, AreaUnit, OverlapPolicy, PixelShape, SortKey};
use crate::boundary::{DEFAULT_NAME_FIELD, DEFAULT_SOURCE};
use crate::error::{Error, Result};
use crate::projection::Crs;
use crate::raster::ValueRange;

/// Number of countries shown in charts when unset
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for GeoTIFF files
    pub raster_dir: PathBuf,
    /// GeoJSON path or http(s) URL of the country boundaries
    pub boundary_source: String,
    /// Feature property holding the country name
    pub name_field: String,
    pub value_min: f64,
    pub value_max: f64,
    pub top_n: usize,
    pub shape: PixelShape,
    pub target_crs: Crs,
    pub overlap: OverlapPolicy,
    pub unit: AreaUnit,
    pub sort: SortKey,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raster_dir: PathBuf::from("tif_directory"),
            boundary_source: DEFAULT_SOURCE.to_string(),
            name_field: DEFAULT_NAME_FIELD.to_string(),
            value_min: 95.0,
            value_max: 100.0,
            top_n: DEFAULT_TOP_N,
            shape: PixelShape::Square,
            target_crs: Crs::world_equal_area(),
            overlap: OverlapPolicy::FullCount,
            unit: AreaUnit::SquareKilometres,
            sort: SortKey::MatchedPixels,
        }
    }
}

impl Config {
    /// Reads and validates a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.value_min.is_finite() || !self.value_max.is_finite() {
            return Err(Error::Config("value range bounds must be finite".to_string()));
        }
        if self.name_field.trim().is_empty() {
            return Err(Error::Config("name_field must not be empty".to_string()));
        }
        if self.target_crs.definition().trim().is_empty() {
            return Err(Error::Config("target_crs must not be empty".to_string()));
        }
        if self.top_n == 0 {
            return Err(Error::Config("top_n must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn range(&self) -> ValueRange {
        ValueRange::new(self.value_min, self.value_max)
    }

    /// Analysis parameters for the configured range
    pub fn to_params(&self) -> AnalysisParams {
        AnalysisParams {
            range: self.range(),
            shape: self.shape,
            target_crs: self.target_crs.clone(),
            unit: self.unit,
            overlap: self.overlap,
            sort: self.sort,
        }
    }
}

/// Replaces `${VAR}` and `${VAR:-default}` with environment values
fn expand_env_vars(content: &str) -> Result<String> {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| Error::Config(format!("Unclosed variable substitution: ${{{}", after)))?;

        let expr = &after[..end];
        let (name, fallback) = match expr.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (expr, None),
        };

        match (env::var(name), fallback) {
            (Ok(value), _) => out.push_str(&value),
            (Err(_), Some(fallback)) => out.push_str(fallback),
            (Err(_), None) => {
                return Err(Error::Config(format!("Environment variable {} is not set", name)))
            }
        }

        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
