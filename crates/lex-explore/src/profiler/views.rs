//! Single-column views.

use super::statistics::{box_plot_summary, build_histogram, describe_column, value_counts};
use crate::config::ExplorerConfig;
use crate::error::{ExploreError, Result};
use crate::types::{ColumnView, Table, ViewKind};
use crate::utils::{missing_count, numeric_values, percentage, sorted_values};
use tracing::debug;

pub(crate) fn column_view(
    table: &Table,
    column: &str,
    kind: ViewKind,
    config: &ExplorerConfig,
) -> Result<ColumnView> {
    let series = table.series(column)?;
    let column_kind = table.kind(column)?;
    debug!("Building {} view for '{}'", kind.label(), column);

    if kind.requires_numeric() && !column_kind.is_numeric() {
        return Err(ExploreError::unsupported(
            kind.label(),
            column,
            series.dtype().to_string(),
        ));
    }

    let view = match kind {
        ViewKind::SummaryStats => ColumnView::SummaryStats {
            summary: describe_column(column, series, column_kind)?,
        },
        ViewKind::NullPercentage => ColumnView::NullPercentage {
            column: column.to_string(),
            percentage: percentage(missing_count(series)?, series.len()),
        },
        ViewKind::Distribution => {
            let sample = numeric_values(series)?;
            let bins = build_histogram(&sorted_values(&sample), config.histogram_bins);
            ColumnView::Distribution {
                column: column.to_string(),
                sample,
                bins,
            }
        }
        ViewKind::BoxPlot => {
            let sample = numeric_values(series)?;
            let summary = box_plot_summary(&sorted_values(&sample));
            ColumnView::BoxPlot {
                column: column.to_string(),
                sample,
                summary,
            }
        }
        ViewKind::ValueCounts => ColumnView::ValueCounts {
            column: column.to_string(),
            counts: value_counts(series)?,
        },
    };

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnSummary;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        Table::new(
            df![
                "age" => [Some(25i64), None, Some(25), Some(40)],
                "city" => [Some("A"), Some("A"), None, Some("B")],
            ]
            .unwrap(),
        )
    }

    fn view(column: &str, kind: ViewKind) -> Result<ColumnView> {
        column_view(&table(), column, kind, &ExplorerConfig::default())
    }

    #[test]
    fn test_every_view_on_numeric_column() {
        for kind in ViewKind::ALL {
            let result = view("age", kind).unwrap();
            assert_eq!(result.kind(), kind);
        }
    }

    #[test]
    fn test_numeric_only_views_reject_text() {
        for kind in [ViewKind::Distribution, ViewKind::BoxPlot] {
            let err = view("city", kind).unwrap_err();
            assert!(err.is_unsupported());
            assert_eq!(err.error_code(), "UNSUPPORTED_OPERATION");
        }
    }

    #[test]
    fn test_text_column_views() {
        let ColumnView::SummaryStats { summary } = view("city", ViewKind::SummaryStats).unwrap()
        else {
            panic!("expected summary view");
        };
        assert!(matches!(summary, ColumnSummary::Categorical(_)));

        let ColumnView::ValueCounts { counts, .. } = view("city", ViewKind::ValueCounts).unwrap()
        else {
            panic!("expected value counts");
        };
        assert_eq!(counts, vec![("A".to_string(), 2), ("B".to_string(), 1)]);
    }

    #[test]
    fn test_null_percentage_view() {
        let ColumnView::NullPercentage { percentage, .. } =
            view("city", ViewKind::NullPercentage).unwrap()
        else {
            panic!("expected null percentage");
        };
        assert_eq!(percentage, 25.0);
    }

    #[test]
    fn test_distribution_sample_skips_missing() {
        let ColumnView::Distribution { sample, bins, .. } =
            view("age", ViewKind::Distribution).unwrap()
        else {
            panic!("expected distribution");
        };
        assert_eq!(sample, vec![25.0, 25.0, 40.0]);
        assert_eq!(bins.len(), ExplorerConfig::default().histogram_bins);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_box_plot_view() {
        let ColumnView::BoxPlot { summary, .. } = view("age", ViewKind::BoxPlot).unwrap() else {
            panic!("expected box plot");
        };
        let summary = summary.unwrap();
        assert_eq!(summary.min, 25.0);
        assert_eq!(summary.median, 25.0);
        assert_eq!(summary.max, 40.0);
    }

    #[test]
    fn test_unknown_column() {
        let err = view("nope", ViewKind::ValueCounts).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
