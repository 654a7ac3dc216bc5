//! Shared utilities for the exploration engine.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::types::CellKey;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Classification of a column for analysis purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point numbers
    Numeric,
    /// String/text values
    Text,
    /// Boolean values
    Boolean,
    /// Date, datetime, time or duration values
    Temporal,
    /// Anything else (nested, binary, mixed)
    Other,
}

impl ColumnKind {
    /// Whether statistics such as mean and quantiles apply to this kind.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }

    /// Short lowercase label used in logs and text output.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Temporal => "temporal",
            ColumnKind::Other => "other",
        }
    }
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a temporal type.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time | DataType::Duration(_)
    )
}

/// Get the kind of a DataType.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if is_temporal_dtype(dtype) {
        ColumnKind::Temporal
    } else if matches!(dtype, DataType::Boolean) {
        ColumnKind::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        ColumnKind::Text
    } else {
        ColumnKind::Other
    }
}

// =============================================================================
// Cell Keys
// =============================================================================

/// Render every cell of a Series as a hashable [`CellKey`].
///
/// Values are rendered through a cast to `String`, so two cells of the same
/// column compare equal exactly when their values do. Signed float zeros
/// share one key. Missing cells (see [`missing_mask`]) become
/// [`CellKey::Missing`].
pub fn cell_keys(series: &Series) -> PolarsResult<Vec<CellKey>> {
    let missing = missing_mask(series)?;
    // -0.0 + 0.0 == +0.0
    let as_text = match series.dtype() {
        DataType::Float64 => series.f64()?.apply_values(|v| v + 0.0).into_series(),
        DataType::Float32 => series.f32()?.apply_values(|v| v + 0.0).into_series(),
        _ => series.clone(),
    }
    .cast(&DataType::String)?;
    let keys = as_text
        .str()?
        .into_iter()
        .zip(missing)
        .map(|(value, is_missing)| match value {
            Some(v) if !is_missing => CellKey::Value(v.to_string()),
            _ => CellKey::Missing,
        })
        .collect();
    Ok(keys)
}

/// Per-row missing flags: nulls, plus NaN in float columns.
pub fn missing_mask(series: &Series) -> PolarsResult<Vec<bool>> {
    if matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
        let values = optional_numeric_values(series)?;
        return Ok(values.iter().map(Option::is_none).collect());
    }

    let mask = series.is_null();
    Ok((0..mask.len()).map(|i| mask.get(i).unwrap_or(false)).collect())
}

/// Number of missing cells (see [`missing_mask`]).
pub fn missing_count(series: &Series) -> PolarsResult<usize> {
    Ok(missing_mask(series)?.into_iter().filter(|m| *m).count())
}

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Collect the non-missing values of a numeric Series as `f64`.
///
/// NaN values are treated as missing.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let floats = series.cast(&DataType::Float64)?;
    let values = floats
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    Ok(values)
}

/// Collect every value of a numeric Series as `Option<f64>`, keeping row positions.
pub fn optional_numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    let values = floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Sort floats ascending (NaN-free input expected).
pub fn sorted_values(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Linear-interpolated quantile of already sorted values.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

/// Median of unsorted values, `None` when there are none.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(quantile_sorted(&sorted_values(values), 0.5))
}

/// Arithmetic mean, `None` when there are no values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator), `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    Some(variance.sqrt())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let values: Vec<Option<f64>> = optional_numeric_values(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Percentage of `part` in `total`, 0.0 for an empty total.
#[inline]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

// =============================================================================
// Tests
// =============================================================================
