//! Row filtering by column membership.

use crate::error::{Result, ResultExt};
use crate::types::{CellKey, FilterSpec, Table};
use crate::utils::{cell_keys, optional_numeric_values};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Keep the rows whose value in `spec.column` is one of `spec.values`.
///
/// Missing cells only match [`CellKey::Missing`]. Numeric columns compare
/// by value, so `"25"` selects a cell holding `25.0`. An empty value list
/// selects nothing to filter on and returns the table unchanged.
pub fn filter(table: &Table, spec: &FilterSpec) -> Result<Table> {
    let series = table.series(&spec.column)?;

    if spec.is_empty() {
        debug!("No filter values selected for '{}'", spec.column);
        return Ok(table.clone());
    }

    let keep = if table.kind(&spec.column)?.is_numeric() {
        numeric_matches(series, &spec.values)?
    } else {
        let wanted: HashSet<&CellKey> = spec.values.iter().collect();
        cell_keys(series)?
            .iter()
            .map(|key| wanted.contains(key))
            .collect()
    };

    let mask = BooleanChunked::from_slice(PlSmallStr::from_static("keep"), &keep);
    let filtered = table
        .data()
        .filter(&mask)
        .context(format!("Failed to filter on '{}'", spec.column))?;

    info!(
        "Filtered on '{}': {} of {} rows kept",
        spec.column,
        filtered.height(),
        table.height()
    );
    Ok(Table::with_kinds_of(filtered, table))
}

/// Membership of each numeric cell in `values`; unparseable values match nothing.
fn numeric_matches(series: &Series, values: &[CellKey]) -> PolarsResult<Vec<bool>> {
    let keep_missing = values.contains(&CellKey::Missing);
    let wanted: Vec<f64> = values
        .iter()
        .filter_map(|key| match key {
            CellKey::Value(v) => v.trim().parse::<f64>().ok(),
            CellKey::Missing => None,
        })
        .collect();

    let keep = optional_numeric_values(series)?
        .into_iter()
        .map(|cell| match cell {
            Some(x) => wanted.contains(&x),
            None => keep_missing,
        })
        .collect();
    Ok(keep)
}

/// Distinct non-missing values of a column in first-seen order.
pub fn filter_options(table: &Table, column: &str) -> Result<Vec<String>> {
    let series = table.series(column)?;
    let mut seen = HashSet::new();
    let options = cell_keys(series)?
        .into_iter()
        .filter_map(|key| match key {
            CellKey::Value(v) => seen.insert(v.clone()).then_some(v),
            CellKey::Missing => None,
        })
        .collect();
    Ok(options)
}
