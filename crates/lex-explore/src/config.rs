//! Configuration types for the exploration engine.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic setup.

use serde::{Deserialize, Serialize};

/// Default number of rows shown in the overview head.
pub const DEFAULT_HEAD_ROWS: usize = 5;

/// Default number of histogram buckets for the distribution view.
pub const DEFAULT_HISTOGRAM_BINS: usize = 24;

/// Default cap on the rows sent to the pairplot.
pub const DEFAULT_PAIRPLOT_MAX_ROWS: usize = 1000;

/// Default seed for row sampling.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// Cell contents treated as missing when loading CSV data.
pub const DEFAULT_NULL_VALUES: [&str; 5] = ["NA", "N/A", "NaN", "nan", "null"];

/// Configuration for loading and profiling.
///
/// Use [`ExplorerConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_explore::config::ExplorerConfig;
///
/// let config = ExplorerConfig::builder()
///     .head_rows(10)
///     .histogram_bins(30)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Rows shown in the overview head.
    /// Default: 5
    pub head_rows: usize,

    /// Rows scanned to infer column types; `None` scans the whole file so a
    /// column is numeric only when every non-missing value parses as a number.
    /// Default: None
    pub infer_schema_length: Option<usize>,

    /// Cell contents treated as missing (empty cells are always missing).
    /// Default: NA, N/A, NaN, nan, null
    pub null_values: Vec<String>,

    /// Whether date-like text columns are parsed as temporal columns.
    /// Default: true
    pub try_parse_dates: bool,

    /// Number of histogram buckets for the distribution view.
    /// Default: 24
    pub histogram_bins: usize,

    /// Maximum rows included in pairplot data; larger tables are sampled.
    /// Default: 1000
    pub pairplot_max_rows: usize,

    /// Seed for the pairplot row sampler.
    /// Default: 42
    pub sample_seed: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            head_rows: DEFAULT_HEAD_ROWS,
            infer_schema_length: None,
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            try_parse_dates: true,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            pairplot_max_rows: DEFAULT_PAIRPLOT_MAX_ROWS,
            sample_seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl ExplorerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ExplorerConfigBuilder {
        ExplorerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.head_rows == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "head_rows".to_string(),
                value: self.head_rows,
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "histogram_bins".to_string(),
                value: self.histogram_bins,
            });
        }

        if self.pairplot_max_rows == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "pairplot_max_rows".to_string(),
                value: self.pairplot_max_rows,
            });
        }

        if self.infer_schema_length == Some(0) {
            return Err(ConfigValidationError::InvalidCount {
                field: "infer_schema_length".to_string(),
                value: 0,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must be at least 1)")]
    InvalidCount { field: String, value: usize },
}

impl From<ConfigValidationError> for crate::error::ExploreError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::ExploreError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`ExplorerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ExplorerConfigBuilder {
    head_rows: Option<usize>,
    infer_schema_length: Option<Option<usize>>,
    null_values: Option<Vec<String>>,
    try_parse_dates: Option<bool>,
    histogram_bins: Option<usize>,
    pairplot_max_rows: Option<usize>,
    sample_seed: Option<u64>,
}

impl ExplorerConfigBuilder {
    /// Set the number of rows shown in the overview head.
    pub fn head_rows(mut self, rows: usize) -> Self {
        self.head_rows = Some(rows);
        self
    }

    /// Limit type inference to the first `rows` rows (`None` = whole file).
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Replace the list of cell contents treated as missing.
    pub fn null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable parsing of date-like columns.
    pub fn try_parse_dates(mut self, enable: bool) -> Self {
        self.try_parse_dates = Some(enable);
        self
    }

    /// Set the number of histogram buckets.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the maximum rows included in pairplot data.
    pub fn pairplot_max_rows(mut self, rows: usize) -> Self {
        self.pairplot_max_rows = Some(rows);
        self
    }

    /// Set the seed for row sampling.
    pub fn sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = Some(seed);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ExplorerConfig` or an error if validation fails.
    pub fn build(self) -> Result<ExplorerConfig, ConfigValidationError> {
        let defaults = ExplorerConfig::default();
        let config = ExplorerConfig {
            head_rows: self.head_rows.unwrap_or(defaults.head_rows),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            null_values: self.null_values.unwrap_or(defaults.null_values),
            try_parse_dates: self.try_parse_dates.unwrap_or(defaults.try_parse_dates),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            pairplot_max_rows: self.pairplot_max_rows.unwrap_or(defaults.pairplot_max_rows),
            sample_seed: self.sample_seed.unwrap_or(defaults.sample_seed),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExplorerConfig::default();
        assert_eq!(config.head_rows, 5);
        assert_eq!(config.infer_schema_length, None);
        assert_eq!(config.histogram_bins, 24);
        assert!(config.try_parse_dates);
        assert!(config.null_values.contains(&"NaN".to_string()));
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = ExplorerConfig::builder().build().unwrap();
        assert_eq!(config, ExplorerConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ExplorerConfig::builder()
            .head_rows(10)
            .infer_schema_length(Some(100))
            .null_values(["-"])
            .try_parse_dates(false)
            .histogram_bins(10)
            .pairplot_max_rows(50)
            .sample_seed(7)
            .build()
            .unwrap();

        assert_eq!(config.head_rows, 10);
        assert_eq!(config.infer_schema_length, Some(100));
        assert_eq!(config.null_values, vec!["-".to_string()]);
        assert!(!config.try_parse_dates);
        assert_eq!(config.histogram_bins, 10);
        assert_eq!(config.pairplot_max_rows, 50);
        assert_eq!(config.sample_seed, 7);
    }

    #[test]
    fn test_validation_rejects_zero_counts() {
        let result = ExplorerConfig::builder().head_rows(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidCount { ref field, .. } if field == "head_rows"
        ));

        assert!(ExplorerConfig::builder().histogram_bins(0).build().is_err());
        assert!(
            ExplorerConfig::builder()
                .infer_schema_length(Some(0))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "head_rows": 3,
            "infer_schema_length": 50,
            "null_values": ["?"],
            "try_parse_dates": false,
            "histogram_bins": 12,
            "pairplot_max_rows": 200,
            "sample_seed": 1
        }"#;

        let config: ExplorerConfig = serde_json::from_str(json).expect("valid config JSON");
        assert_eq!(config.head_rows, 3);
        assert_eq!(config.infer_schema_length, Some(50));
        assert_eq!(config.null_values, vec!["?".to_string()]);
        assert!(config.validate().is_ok());
    }
}
