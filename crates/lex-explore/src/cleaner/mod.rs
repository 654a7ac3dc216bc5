//! Data cleaning module.
//!
//! Cleaning runs two steps in a fixed order:
//! 1. Remove exact duplicate rows, keeping the first occurrence
//! 2. Fill missing values of numeric columns with the column median
//!
//! The median is taken after deduplication, over the whole column.

use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::types::{CellKey, CleaningReport, Table};
use crate::utils::cell_keys;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Data cleaner for deduplication and median imputation.
pub struct DataCleaner;

impl DataCleaner {
    /// Clean a table, returning a new one.
    pub fn clean(table: &Table) -> Result<Table> {
        Self::clean_with_report(table).map(|(table, _)| table)
    }

    /// Clean a table and describe what changed.
    pub fn clean_with_report(table: &Table) -> Result<(Table, CleaningReport)> {
        info!("Performing data cleaning...");

        let rows_before = table.height();
        let deduped = Self::drop_duplicates(table)?;
        let rows_after = deduped.height();
        let duplicates_removed = rows_before - rows_after;

        if duplicates_removed > 0 {
            debug!("Removed {} duplicate rows", duplicates_removed);
        } else {
            debug!("No duplicate rows found");
        }

        let numeric_columns = deduped.numeric_columns();
        let mut df = deduped.into_inner();
        let mut imputations = Vec::new();
        for column in &numeric_columns {
            if let Some(imputation) = StatisticalImputer::apply_numeric_median(&mut df, column)? {
                imputations.push(imputation);
            }
        }

        info!(
            "Cleaning complete: {} duplicate rows removed, {} columns imputed",
            duplicates_removed,
            imputations.len()
        );

        // imputation can turn integer columns into floats, so reclassify
        let cleaned = Table::new(df);
        let report = CleaningReport {
            rows_before,
            rows_after,
            duplicates_removed,
            imputations,
        };
        Ok((cleaned, report))
    }

    /// Remove rows whose cells all equal those of an earlier row.
    ///
    /// Missing equals missing. Survivors keep their relative order.
    pub fn drop_duplicates(table: &Table) -> Result<Table> {
        let df = table.data();
        let height = df.height();

        let mut columns = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            columns.push(cell_keys(col.as_materialized_series())?);
        }

        let mut seen: HashSet<Vec<CellKey>> = HashSet::with_capacity(height);
        let keep: Vec<bool> = (0..height)
            .map(|row| {
                let key: Vec<CellKey> = columns.iter().map(|cells| cells[row].clone()).collect();
                seen.insert(key)
            })
            .collect();

        if keep.iter().all(|k| *k) {
            return Ok(table.clone());
        }

        let mask = BooleanChunked::from_slice(PlSmallStr::from_static("keep"), &keep);
        let filtered = df.filter(&mask)?;
        Ok(Table::with_kinds_of(filtered, table))
    }
}

/// Clean a table with [`DataCleaner::clean`].
pub fn clean(table: &Table) -> Result<Table> {
    DataCleaner::clean(table)
}
