//! Statistical imputation methods.

use crate::error::{ExploreError, Result};
use crate::types::Imputation;
use crate::utils::{fill_numeric_nulls, median, missing_count, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Replace the missing values of a numeric column with the median of its
    /// non-missing values.
    ///
    /// Returns `None` when nothing was filled: the column has no missing
    /// values, or no non-missing value to take a median from.
    pub fn apply_numeric_median(df: &mut DataFrame, col_name: &str) -> Result<Option<Imputation>> {
        let series = df
            .column(col_name)
            .map_err(|_| ExploreError::ColumnNotFound(col_name.to_string()))?
            .as_materialized_series()
            .clone();

        let missing = missing_count(&series)?;
        if missing == 0 {
            return Ok(None);
        }

        let Some(median_val) = median(&numeric_values(&series)?) else {
            debug!("Column '{}' has no observed values, leaving it as is", col_name);
            return Ok(None);
        };

        let filled = fill_numeric_nulls(&series, median_val)?;
        df.replace(col_name, filled)?;
        debug!(
            "Filled {} missing values in '{}' with median {:.4}",
            missing, col_name, median_val
        );

        Ok(Some(Imputation {
            column: col_name.to_string(),
            median: median_val,
            filled: missing,
        }))
    }
}
