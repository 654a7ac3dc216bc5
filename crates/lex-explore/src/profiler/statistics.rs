//! Descriptive statistics for column summaries and views.

use crate::types::{
    BoxPlotSummary, CategoricalSummary, ColumnSummary, HistogramBin, NumericSummary,
};
use crate::utils::{ColumnKind, cell_keys, mean, numeric_values, quantile_sorted, sample_std, sorted_values};
use polars::prelude::*;
use std::collections::HashMap;

/// Describe one column: numeric statistics for numeric kinds, frequency
/// statistics for everything else.
pub(crate) fn describe_column(
    name: &str,
    series: &Series,
    kind: ColumnKind,
) -> PolarsResult<ColumnSummary> {
    if kind.is_numeric() {
        describe_numeric(name, series).map(ColumnSummary::Numeric)
    } else {
        describe_categorical(name, series).map(ColumnSummary::Categorical)
    }
}

fn describe_numeric(name: &str, series: &Series) -> PolarsResult<NumericSummary> {
    let values = numeric_values(series)?;
    let sorted = sorted_values(&values);
    let quantile = |q: f64| (!sorted.is_empty()).then(|| quantile_sorted(&sorted, q));

    Ok(NumericSummary {
        column: name.to_string(),
        count: values.len(),
        mean: mean(&values),
        std: sample_std(&values),
        min: sorted.first().copied(),
        q25: quantile(0.25),
        median: quantile(0.5),
        q75: quantile(0.75),
        max: sorted.last().copied(),
    })
}

fn describe_categorical(name: &str, series: &Series) -> PolarsResult<CategoricalSummary> {
    let counts = value_counts(series)?;
    let count = counts.iter().map(|(_, c)| c).sum();
    let (top, freq) = counts
        .first()
        .map(|(value, c)| (Some(value.clone()), *c))
        .unwrap_or((None, 0));

    Ok(CategoricalSummary {
        column: name.to_string(),
        count,
        unique: counts.len(),
        top,
        freq,
    })
}

/// Distinct non-missing values with their counts.
///
/// Sorted by descending count; equal counts keep first-seen order.
pub(crate) fn value_counts(series: &Series) -> PolarsResult<Vec<(String, usize)>> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for key in cell_keys(series)? {
        let Some(value) = key.as_value() else {
            continue;
        };
        match positions.get(value) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(value.to_string(), counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    // stable sort keeps first-seen order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

/// Equal-width histogram over sorted values.
pub(crate) fn build_histogram(sorted: &[f64], bins: usize) -> Vec<HistogramBin> {
    if sorted.is_empty() {
        return Vec::new();
    }

    let min = sorted.first().copied().unwrap_or(0.0);
    let max = sorted.last().copied().unwrap_or(min);
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted.len(),
        }];
    }

    let bin_count = bins.max(1);
    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];

    for value in sorted {
        let mut index = ((value - min) / width) as usize;
        if index >= bin_count {
            index = bin_count - 1;
        }
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: min + (idx as f64 + 1.0) * width,
            count,
        })
        .collect()
}

/// Five-number summary with 1.5 * IQR whiskers over sorted values.
pub(crate) fn box_plot_summary(sorted: &[f64]) -> Option<BoxPlotSummary> {
    let min = *sorted.first()?;
    let max = *sorted.last()?;
    let q1 = quantile_sorted(sorted, 0.25);
    let median = quantile_sorted(sorted, 0.5);
    let q3 = quantile_sorted(sorted, 0.75);

    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let inside = || sorted.iter().copied().filter(|v| (lower_fence..=upper_fence).contains(v));
    let lower_whisker = inside().next().unwrap_or(min);
    let upper_whisker = inside().last().unwrap_or(max);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lower_fence || *v > upper_fence)
        .collect();

    Some(BoxPlotSummary {
        min,
        q1,
        median,
        q3,
        max,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== describe tests ====================

    #[test]
    fn test_describe_numeric_matches_textbook_values() {
        let series = Series::new("val".into(), &[Some(1.0f64), Some(2.0), None, Some(3.0), Some(4.0)]);
        let ColumnSummary::Numeric(summary) =
            describe_column("val", &series, ColumnKind::Numeric).unwrap()
        else {
            panic!("expected numeric summary");
        };

        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, Some(2.5));
        assert!((summary.std.unwrap() - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.q25, Some(1.75));
        assert_eq!(summary.median, Some(2.5));
        assert_eq!(summary.q75, Some(3.25));
        assert_eq!(summary.max, Some(4.0));
    }

    #[test]
    fn test_describe_numeric_all_missing() {
        let series = Series::new("val".into(), &[None::<f64>, None]);
        let ColumnSummary::Numeric(summary) =
            describe_column("val", &series, ColumnKind::Numeric).unwrap()
        else {
            panic!("expected numeric summary");
        };
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.median, None);
    }

    #[test]
    fn test_describe_categorical() {
        let series = Series::new("city".into(), &[Some("B"), Some("A"), None, Some("A"), Some("B")]);
        let ColumnSummary::Categorical(summary) =
            describe_column("city", &series, ColumnKind::Text).unwrap()
        else {
            panic!("expected categorical summary");
        };

        assert_eq!(summary.count, 4);
        assert_eq!(summary.unique, 2);
        // tie between A and B resolved by first appearance
        assert_eq!(summary.top.as_deref(), Some("B"));
        assert_eq!(summary.freq, 2);
    }

    #[test]
    fn test_describe_boolean_is_categorical() {
        let series = Series::new("flag".into(), &[true, false, true]);
        let summary = describe_column("flag", &series, ColumnKind::Boolean).unwrap();
        assert!(matches!(summary, ColumnSummary::Categorical(_)));
        assert_eq!(summary.count(), 3);
    }

    // ==================== value_counts tests ====================

    #[test]
    fn test_value_counts_orders_by_count_then_first_seen() {
        let series = Series::new(
            "city".into(),
            &[Some("C"), Some("A"), Some("B"), Some("A"), None, Some("B"), Some("A")],
        );
        let counts = value_counts(&series).unwrap();
        assert_eq!(
            counts,
            vec![
                ("A".to_string(), 3),
                ("B".to_string(), 2),
                ("C".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_value_counts_empty() {
        let series = Series::new("city".into(), &[None::<&str>]);
        assert!(value_counts(&series).unwrap().is_empty());
    }

    // ==================== histogram tests ====================

    #[test]
    fn test_histogram_counts_every_value() {
        let sorted = [1.0, 2.0, 2.5, 3.0, 10.0];
        let bins = build_histogram(&sorted, 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(bins[0].start, 1.0);
        assert_eq!(bins[2].end, 10.0);
        // the maximum lands in the last (closed) bucket
        assert_eq!(bins[2].count, 1);
    }

    #[test]
    fn test_histogram_constant_values() {
        let bins = build_histogram(&[4.0, 4.0, 4.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(build_histogram(&[], 10).is_empty());
    }

    // ==================== box plot tests ====================

    #[test]
    fn test_box_plot_summary_with_outlier() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let summary = box_plot_summary(&sorted).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.median, 5.5);
        assert_eq!(summary.outliers, vec![100.0]);
        assert_eq!(summary.upper_whisker, 9.0);
        assert_eq!(summary.lower_whisker, 1.0);
    }

    #[test]
    fn test_box_plot_summary_empty() {
        assert!(box_plot_summary(&[]).is_none());
    }
}
