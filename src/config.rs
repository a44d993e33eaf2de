//! Index configuration.
//!
//! Every knob here is a performance trade-off; none of them changes which
//! objects a query returns, only how much work it takes to find them.

use crate::error::{GeoIndexError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted quad tree depth. At level 32 a leaf spans well under a
/// millimetre, so deeper trees only add empty nodes.
pub const MAX_TREE_LEVEL: u32 = 32;

/// Tuning parameters for [`QuadTree`](crate::QuadTree) and
/// [`SpatialHash`](crate::SpatialHash).
///
/// # Example
///
/// ```rust
/// use geoindex::IndexConfig;
///
/// let config = IndexConfig::default();
/// assert_eq!(config.max_level, 16);
///
/// let json = r#"{
///     "max_level": 12,
///     "estimate_sample_size": 250
/// }"#;
/// let config = IndexConfig::from_json(json).unwrap();
/// assert_eq!(config.max_level, 12);
/// assert_eq!(config.row_lookup_factor, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Depth of the quad tree leaves (0 = the root is the only leaf).
    #[serde(default = "IndexConfig::default_max_level")]
    pub max_level: u32,

    /// Number of objects, in rank order, sampled to estimate total hits
    /// after a linear scan.
    #[serde(default = "IndexConfig::default_estimate_sample_size")]
    pub estimate_sample_size: usize,

    /// Buckets per row in the spatial hash latitude table. Rows have uneven
    /// latitude spans, so this table is finer than the row count.
    #[serde(default = "IndexConfig::default_row_lookup_factor")]
    pub row_lookup_factor: usize,

    /// Buckets per row slot in each row's longitude table.
    #[serde(default = "IndexConfig::default_column_lookup_factor")]
    pub column_lookup_factor: usize,

    /// Fixed number of objects per spatial hash row. `None` picks
    /// `ceil(sqrt(n - 1)) + 1`, which suits roughly uniform data.
    #[serde(default)]
    pub row_size: Option<usize>,
}

impl IndexConfig {
    const fn default_max_level() -> u32 {
        16
    }

    const fn default_estimate_sample_size() -> usize {
        100
    }

    const fn default_row_lookup_factor() -> usize {
        10
    }

    const fn default_column_lookup_factor() -> usize {
        1
    }

    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_estimate_sample_size(mut self, sample_size: usize) -> Self {
        self.estimate_sample_size = sample_size;
        self
    }

    pub fn with_lookup_factors(mut self, row: usize, column: usize) -> Self {
        self.row_lookup_factor = row;
        self.column_lookup_factor = column;
        self
    }

    pub fn with_row_size(mut self, row_size: usize) -> Self {
        self.row_size = Some(row_size);
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_level > MAX_TREE_LEVEL {
            return Err(GeoIndexError::InvalidConfig(format!(
                "max_level must be at most {}, got {}",
                MAX_TREE_LEVEL, self.max_level
            )));
        }

        if self.estimate_sample_size == 0 {
            return Err(GeoIndexError::InvalidConfig(
                "estimate_sample_size must be greater than zero".to_string(),
            ));
        }

        if self.row_lookup_factor == 0 || self.column_lookup_factor == 0 {
            return Err(GeoIndexError::InvalidConfig(
                "lookup factors must be greater than zero".to_string(),
            ));
        }

        if self.row_size == Some(0) {
            return Err(GeoIndexError::InvalidConfig(
                "row_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: IndexConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a file, choosing the format from its
    /// extension (`.json`, or `.toml` with the toml feature).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            #[cfg(feature = "toml")]
            Some("toml") => Self::from_toml(&contents),
            _ => Err(GeoIndexError::InvalidConfig(format!(
                "Unsupported configuration file: {}",
                path.display()
            ))),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_level: Self::default_max_level(),
            estimate_sample_size: Self::default_estimate_sample_size(),
            row_lookup_factor: Self::default_row_lookup_factor(),
            column_lookup_factor: Self::default_column_lookup_factor(),
            row_size: None,
        }
    }
}
