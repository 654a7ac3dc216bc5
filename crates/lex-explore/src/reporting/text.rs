//! Plain-text renderings of analysis results.

use crate::session::{Notice, Section, SectionOutcome};
use crate::types::{
    CleaningReport, ColumnSummary, ColumnView, CorrelationMatrix, NullReport, Overview, Pairplot,
    TablePreview,
};
use std::fmt::Write;

const MISSING: &str = "NaN";

/// Row labels in the order a mixed summary table shows them.
const SUMMARY_ROWS: [&str; 11] = [
    "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

fn number(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.6}", v),
        None => MISSING.to_string(),
    }
}

/// Render rows under headers with every column padded to its widest cell.
///
/// The first column is left-aligned, the rest right-aligned.
fn grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let width = widths.get(idx).copied().unwrap_or(0);
                if idx == 0 {
                    format!("{:<width$}", cell, width = width)
                } else {
                    format!("{:>width$}", cell, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(headers);
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

fn summary_cell(summary: &ColumnSummary, label: &str) -> Option<String> {
    match summary {
        ColumnSummary::Numeric(s) => {
            let value = match label {
                "count" => return Some(format!("{:.6}", s.count as f64)),
                "mean" => s.mean,
                "std" => s.std,
                "min" => s.min,
                "25%" => s.q25,
                "50%" => s.median,
                "75%" => s.q75,
                "max" => s.max,
                _ => return None,
            };
            Some(number(value))
        }
        ColumnSummary::Categorical(s) => match label {
            "count" => Some(s.count.to_string()),
            "unique" => Some(s.unique.to_string()),
            "top" => Some(s.top.clone().unwrap_or_else(|| MISSING.to_string())),
            "freq" => Some(s.freq.to_string()),
            _ => None,
        },
    }
}

/// Summary statistics as a table with one column per summarized column.
///
/// Rows that apply to none of the columns are left out, so an all-numeric
/// summary shows count/mean/std/min/quartiles/max only.
pub fn summary_text(summaries: &[ColumnSummary]) -> String {
    if summaries.is_empty() {
        return "No columns to summarize.\n".to_string();
    }

    let mut headers = vec![String::new()];
    headers.extend(summaries.iter().map(|s| s.column().to_string()));

    let rows: Vec<Vec<String>> = SUMMARY_ROWS
        .iter()
        .filter(|label| summaries.iter().any(|s| summary_cell(s, label).is_some()))
        .map(|label| {
            let mut row = vec![label.to_string()];
            row.extend(
                summaries
                    .iter()
                    .map(|s| summary_cell(s, label).unwrap_or_else(|| MISSING.to_string())),
            );
            row
        })
        .collect();

    grid(&headers, &rows)
}

/// Column listing with non-null counts and dtypes.
pub fn info_text(overview: &Overview) -> String {
    let (rows, cols) = overview.shape;
    let mut out = format!("Table: {} rows x {} columns\n", rows, cols);

    let headers: Vec<String> = ["#", "Column", "Non-Null Count", "Dtype"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let body: Vec<Vec<String>> = overview
        .columns
        .iter()
        .enumerate()
        .map(|(idx, info)| {
            vec![
                idx.to_string(),
                info.name.clone(),
                format!("{} non-null", info.non_null_count),
                info.dtype.clone(),
            ]
        })
        .collect();
    out.push_str(&grid(&headers, &body));
    out
}

impl Overview {
    /// See [`info_text`].
    pub fn info_text(&self) -> String {
        info_text(self)
    }

    /// See [`summary_text`].
    pub fn summary_text(&self) -> String {
        summary_text(&self.summary)
    }
}

/// Table preview as an aligned grid; missing cells print as `NaN`.
pub fn preview_text(preview: &TablePreview) -> String {
    let mut headers = vec![String::new()];
    headers.extend(preview.columns.iter().cloned());
    let rows: Vec<Vec<String>> = preview
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = vec![idx.to_string()];
            cells.extend(
                row.iter()
                    .map(|cell| cell.clone().unwrap_or_else(|| MISSING.to_string())),
            );
            cells
        })
        .collect();

    let mut out = grid(&headers, &rows);
    if preview.rows.len() < preview.total_rows {
        let _ = writeln!(out, "... {} of {} rows shown", preview.rows.len(), preview.total_rows);
    }
    out
}

pub fn correlation_text(matrix: &CorrelationMatrix) -> String {
    let mut headers = vec![String::new()];
    headers.extend(matrix.columns.iter().cloned());
    let rows: Vec<Vec<String>> = matrix
        .columns
        .iter()
        .zip(&matrix.values)
        .map(|(name, values)| {
            let mut row = vec![name.clone()];
            row.extend(values.iter().map(|v| number(*v)));
            row
        })
        .collect();
    grid(&headers, &rows)
}

/// Null percentages, one row per group (or per feature when ungrouped).
pub fn null_report_text(report: &NullReport) -> String {
    if !report.is_grouped() {
        let headers = vec![String::new(), "Null Percentage".to_string()];
        let rows: Vec<Vec<String>> = match report.rows.first() {
            Some(row) => report
                .feature_columns
                .iter()
                .zip(&row.percentages)
                .map(|(feature, pct)| vec![feature.clone(), format!("{:.2}", pct)])
                .collect(),
            None => Vec::new(),
        };
        return grid(&headers, &rows);
    }

    let mut headers = report.group_columns.clone();
    headers.extend(report.feature_columns.iter().cloned());
    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row
                .group_key
                .iter()
                .flatten()
                .map(|key| key.to_string())
                .collect();
            cells.extend(row.percentages.iter().map(|pct| format!("{:.2}", pct)));
            cells
        })
        .collect();
    grid(&headers, &rows)
}

pub fn column_view_text(view: &ColumnView) -> String {
    match view {
        ColumnView::SummaryStats { summary } => summary_text(std::slice::from_ref(summary)),
        ColumnView::NullPercentage { column, percentage } => {
            format!("Null Percentage for {}: {:.2}%\n", column, percentage)
        }
        ColumnView::Distribution {
            column,
            sample,
            bins,
        } => {
            let mut out = format!("Distribution of {} ({} values)\n", column, sample.len());
            let peak = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
            for bin in bins {
                let bar = "#".repeat((bin.count * 40).div_ceil(peak));
                let _ = writeln!(
                    out,
                    "[{:>12.4}, {:>12.4}) {:>6} {}",
                    bin.start, bin.end, bin.count, bar
                );
            }
            out
        }
        ColumnView::BoxPlot {
            column,
            sample,
            summary,
        } => match summary {
            Some(s) => {
                let mut out = format!("Box Plot of {} ({} values)\n", column, sample.len());
                let _ = writeln!(
                    out,
                    "min {:.4} | whisker {:.4} | Q1 {:.4} | median {:.4} | Q3 {:.4} | whisker {:.4} | max {:.4}",
                    s.min, s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker, s.max
                );
                let _ = writeln!(out, "outliers: {:?}", s.outliers);
                out
            }
            None => format!("Box Plot of {}: no values\n", column),
        },
        ColumnView::ValueCounts { column, counts } => {
            let headers = vec![column.clone(), "count".to_string()];
            let rows: Vec<Vec<String>> = counts
                .iter()
                .map(|(value, count)| vec![value.clone(), count.to_string()])
                .collect();
            grid(&headers, &rows)
        }
    }
}

fn cleaning_text(report: &CleaningReport) -> String {
    let mut out = format!(
        "{} duplicate row(s) removed ({} -> {} rows)\n",
        report.duplicates_removed, report.rows_before, report.rows_after
    );
    for imputation in &report.imputations {
        let _ = writeln!(
            out,
            "'{}': {} missing value(s) filled with median {}",
            imputation.column, imputation.filled, imputation.median
        );
    }
    out
}

fn overview_text(overview: &Overview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-- Data Overview --\n{}", preview_text(&overview.head));
    let _ = writeln!(out, "-- Dataset Info --\n{}", overview.info_text());
    let _ = writeln!(out, "-- Summary Statistics --\n{}", overview.summary_text());

    let headers = vec![String::new(), "missing".to_string()];
    let rows: Vec<Vec<String>> = overview
        .missing
        .iter()
        .map(|(name, count)| vec![name.clone(), count.to_string()])
        .collect();
    let _ = writeln!(out, "-- Missing Values --\n{}", grid(&headers, &rows));

    match &overview.correlation {
        Some(matrix) => {
            let _ = writeln!(out, "-- Correlation Matrix --\n{}", correlation_text(matrix));
        }
        None => {
            let _ = writeln!(
                out,
                "-- Correlation Matrix --\nNeeds at least two numeric columns.\n"
            );
        }
    }

    match &overview.pairplot {
        Pairplot::NoNumericColumns => {
            let _ = writeln!(out, "-- Pairplot --\nNo numeric columns available for pairplot.");
        }
        Pairplot::Available {
            columns,
            values,
            total_rows,
        } => {
            let _ = writeln!(
                out,
                "-- Pairplot --\n{} numeric column(s), {} of {} rows: {}",
                columns.len(),
                values.first().map(Vec::len).unwrap_or(0),
                total_rows,
                columns.join(", ")
            );
        }
    }
    out
}

/// Render a section's body.
pub fn section_text(section: &Section) -> String {
    match section {
        Section::RawData { table } => preview_text(table),
        Section::Cleaned { table, report } => {
            format!("{}\n{}", cleaning_text(report), preview_text(table))
        }
        Section::Filtered { column, table, .. } => {
            format!("Filtered Data based on {}:\n{}", column, preview_text(table))
        }
        Section::Exploratory { overview } => overview_text(overview),
        Section::Narrative {
            provider,
            model,
            text,
        } => match model {
            Some(model) => format!("[{} / {}]\n{}\n", provider, model, text.trim_end()),
            None => format!("[{}]\n{}\n", provider, text.trim_end()),
        },
        Section::NullPercentage { report } => null_report_text(report),
        Section::ColumnView { view } => column_view_text(view),
    }
}

fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::Failed { .. } => format!("error: {}\n", notice),
        _ => format!("note: {}\n", notice),
    }
}

/// Render one outcome with its heading, notices and body.
pub fn outcome_text(outcome: &SectionOutcome) -> String {
    let title = outcome.option.label();
    let mut out = format!("== {} ==\n", title);
    for notice in &outcome.notices {
        out.push_str(&notice_text(notice));
    }
    if let Some(section) = &outcome.section {
        out.push_str(&section_text(section));
    }
    out
}
