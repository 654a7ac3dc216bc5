//! Data profiling module for dataset analysis.
//!
//! This module provides the read-only views of a table:
//! - Dataset overview (head, column info, summary statistics, missing counts)
//! - Correlation matrix and pairplot data over numeric columns
//! - Missing-value percentages, optionally grouped
//! - Single-column views (stats, null rate, distribution, box plot, counts)

mod correlation;
mod nulls;
mod statistics;
mod views;

use crate::config::ExplorerConfig;
use crate::error::{Result, ResultExt};
use crate::types::{ColumnInfo, ColumnSummary, ColumnView, NullReport, Overview, Table, ViewKind};
use crate::utils::missing_count;
use tracing::{debug, info};

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile an entire table.
    pub fn overview(table: &Table, config: &ExplorerConfig) -> Result<Overview> {
        info!(
            "Profiling dataset: {} rows x {} columns",
            table.height(),
            table.width()
        );

        let mut columns = Vec::with_capacity(table.width());
        let mut summary = Vec::with_capacity(table.width());
        let mut missing = Vec::with_capacity(table.width());

        for (name, kind) in table.column_kinds() {
            let series = table.series(name)?;
            let null_count = missing_count(series)?;

            columns.push(ColumnInfo {
                name: name.to_string(),
                dtype: series.dtype().to_string(),
                kind,
                non_null_count: series.len() - null_count,
                null_count,
            });
            summary.push(
                statistics::describe_column(name, series, kind)
                    .context(format!("Failed to describe column '{}'", name))?,
            );
            missing.push((name.to_string(), null_count));
        }

        let correlation = correlation::correlation_matrix(table).context("Failed to correlate")?;
        let pairplot = correlation::pairplot(table, config.pairplot_max_rows, config.sample_seed)
            .context("Failed to build pairplot data")?;

        debug!(
            "Overview ready: {} summaries, correlation {}",
            summary.len(),
            if correlation.is_some() { "computed" } else { "skipped" }
        );

        Ok(Overview {
            shape: (table.height(), table.width()),
            head: table.preview(config.head_rows)?,
            columns,
            summary,
            missing,
            correlation,
            pairplot,
        })
    }

    /// Summary statistics of the numeric columns, or of every column when
    /// none is numeric.
    pub fn describe(table: &Table) -> Result<Vec<ColumnSummary>> {
        let has_numeric = table.column_kinds().any(|(_, kind)| kind.is_numeric());
        let mut summaries = Vec::new();
        for (name, kind) in table.column_kinds() {
            if has_numeric && !kind.is_numeric() {
                continue;
            }
            let series = table.series(name)?;
            summaries.push(
                statistics::describe_column(name, series, kind)
                    .context(format!("Failed to describe column '{}'", name))?,
            );
        }
        Ok(summaries)
    }

    /// Percentage of missing values per feature, split by group when
    /// `group_columns` is non-empty.
    pub fn null_percentage(
        table: &Table,
        group_columns: &[String],
        feature_columns: &[String],
    ) -> Result<NullReport> {
        table.ensure_columns(group_columns)?;
        table.ensure_columns(feature_columns)?;
        debug!(
            "Null percentage for {:?} grouped by {:?}",
            feature_columns, group_columns
        );
        nulls::null_report(table, group_columns, feature_columns)
            .context("Failed to compute null percentages")
    }

    /// Build one view of one column.
    pub fn column_view(
        table: &Table,
        column: &str,
        kind: ViewKind,
        config: &ExplorerConfig,
    ) -> Result<ColumnView> {
        views::column_view(table, column, kind, config)
    }
}
