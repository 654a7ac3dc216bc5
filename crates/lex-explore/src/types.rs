use crate::error::{ExploreError, Result};
use crate::utils::{ColumnKind, cell_keys, column_kind};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Table
// ============================================================================

/// An in-memory dataset: a Polars `DataFrame` plus the kind of every column.
///
/// Column kinds are computed once when the table is built. Transformations
/// that can change dtypes (cleaning) build a fresh `Table`; transformations
/// that only select rows (filtering) carry the kinds over.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    kinds: Vec<ColumnKind>,
}

impl Table {
    /// Wrap a DataFrame, classifying each column from its dtype.
    pub fn new(df: DataFrame) -> Self {
        let kinds = df
            .get_columns()
            .iter()
            .map(|col| column_kind(col.dtype()))
            .collect();
        Self { df, kinds }
    }

    /// Wrap a row subset of an existing table, reusing its classification.
    pub(crate) fn with_kinds_of(df: DataFrame, source: &Table) -> Self {
        Self {
            df,
            kinds: source.kinds.clone(),
        }
    }

    /// The underlying DataFrame.
    pub fn data(&self) -> &DataFrame {
        &self.df
    }

    /// Consume the table and return the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.df
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Column names paired with their kinds, in table order.
    pub fn column_kinds(&self) -> impl Iterator<Item = (&str, ColumnKind)> + '_ {
        self.df
            .get_columns()
            .iter()
            .zip(self.kinds.iter().copied())
            .map(|(col, kind)| (col.name().as_str(), kind))
    }

    /// Kind of the named column.
    pub fn kind(&self, column: &str) -> Result<ColumnKind> {
        self.column_kinds()
            .find(|(name, _)| *name == column)
            .map(|(_, kind)| kind)
            .ok_or_else(|| ExploreError::ColumnNotFound(column.to_string()))
    }

    /// Names of the columns classified numeric.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.column_kinds()
            .filter(|(_, kind)| kind.is_numeric())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// The named column as a Series.
    pub fn series(&self, column: &str) -> Result<&Series> {
        self.df
            .column(column)
            .map(|col| col.as_materialized_series())
            .map_err(|_| ExploreError::ColumnNotFound(column.to_string()))
    }

    /// Fail with `ColumnNotFound` for the first unknown name.
    pub fn ensure_columns<S: AsRef<str>>(&self, columns: &[S]) -> Result<()> {
        for column in columns {
            self.series(column.as_ref())?;
        }
        Ok(())
    }

    /// Render the first `limit` rows as text cells for display or JSON.
    pub fn preview(&self, limit: usize) -> Result<TablePreview> {
        TablePreview::from_table(self, limit)
    }
}

/// Two tables are equal when they hold the same columns, dtypes and values
/// (missing equal to missing).
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.kinds == other.kinds
            && self.df.schema() == other.df.schema()
            && self.df.equals_missing(&other.df)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.df)
    }
}

/// Serializable rendering of (part of) a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub dtypes: Vec<String>,
    /// Total number of rows in the source table.
    pub total_rows: usize,
    /// Row-major cells; `None` marks a missing value.
    pub rows: Vec<Vec<Option<String>>>,
}

impl TablePreview {
    fn from_table(table: &Table, limit: usize) -> Result<Self> {
        let head = table.data().head(Some(limit));
        let mut column_cells = Vec::with_capacity(head.width());
        for col in head.get_columns() {
            column_cells.push(cell_keys(col.as_materialized_series())?);
        }

        let rows = (0..head.height())
            .map(|row| {
                column_cells
                    .iter()
                    .map(|cells| cells[row].as_value().map(str::to_string))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns: table.column_names(),
            dtypes: head
                .get_columns()
                .iter()
                .map(|col| col.dtype().to_string())
                .collect(),
            total_rows: table.height(),
            rows,
        })
    }
}

static_assertions::assert_impl_all!(Table: Send, Sync, Clone);

// ============================================================================
// Cell Keys
// ============================================================================

/// A single cell rendered as a hashable key.
///
/// Used for grouping, value counts, deduplication and filter membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKey {
    /// The cell holds no observation.
    Missing,
    /// The cell's value, rendered as text.
    Value(String),
}

impl CellKey {
    /// Shorthand for `CellKey::Value`.
    pub fn value(v: impl Into<String>) -> Self {
        CellKey::Value(v.into())
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            CellKey::Value(v) => Some(v),
            CellKey::Missing => None,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKey::Missing => write!(f, "NaN"),
            CellKey::Value(v) => write!(f, "{}", v),
        }
    }
}

// ============================================================================
// Descriptive Statistics
// ============================================================================

/// Per-column metadata shown in the dataset info block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub non_null_count: usize,
    pub null_count: usize,
}

/// Descriptive statistics of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

impl ColumnSummary {
    pub fn column(&self) -> &str {
        match self {
            ColumnSummary::Numeric(s) => &s.column,
            ColumnSummary::Categorical(s) => &s.column,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            ColumnSummary::Numeric(s) => s.count,
            ColumnSummary::Categorical(s) => s.count,
        }
    }
}

/// count / mean / std / min / quartiles / max. Undefined values are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// count / unique / top / freq.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

/// Pairwise Pearson correlation over numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]`; `None` where the coefficient is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Data behind a scatter-matrix plot of the numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Pairplot {
    /// The table has no numeric column to plot.
    NoNumericColumns,
    Available {
        columns: Vec<String>,
        /// Column-major values, row-aligned across columns.
        values: Vec<Vec<Option<f64>>>,
        /// Rows in the table before sampling.
        total_rows: usize,
    },
}

/// Everything the exploratory-analysis section shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub shape: (usize, usize),
    pub head: TablePreview,
    pub columns: Vec<ColumnInfo>,
    pub summary: Vec<ColumnSummary>,
    /// Missing-value count per column, in table order.
    pub missing: Vec<(String, usize)>,
    /// `None` when fewer than two numeric columns exist.
    pub correlation: Option<CorrelationMatrix>,
    pub pairplot: Pairplot,
}

// ============================================================================
// Null Report
// ============================================================================

/// Missing-value percentages, optionally per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullReport {
    pub group_columns: Vec<String>,
    pub feature_columns: Vec<String>,
    pub rows: Vec<NullReportRow>,
}

/// One group (or the whole table) in a [`NullReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullReportRow {
    /// `None` for the ungrouped report.
    pub group_key: Option<Vec<CellKey>>,
    pub row_count: usize,
    /// Percentage in [0, 100] per feature column, in `feature_columns` order.
    pub percentages: Vec<f64>,
}

impl NullReport {
    pub fn is_grouped(&self) -> bool {
        !self.group_columns.is_empty()
    }

    /// Percentage for `feature` in the group identified by `key`
    /// (`None` addresses the ungrouped row).
    pub fn percentage(&self, key: Option<&[CellKey]>, feature: &str) -> Option<f64> {
        let idx = self.feature_columns.iter().position(|c| c == feature)?;
        self.rows
            .iter()
            .find(|row| row.group_key.as_deref() == key)
            .map(|row| row.percentages[idx])
    }
}

// ============================================================================
// Column Views
// ============================================================================

/// The per-column views a user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    SummaryStats,
    NullPercentage,
    Distribution,
    BoxPlot,
    ValueCounts,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::SummaryStats,
        ViewKind::NullPercentage,
        ViewKind::Distribution,
        ViewKind::BoxPlot,
        ViewKind::ValueCounts,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            ViewKind::SummaryStats => "Summary Statistics",
            ViewKind::NullPercentage => "Null Percentage",
            ViewKind::Distribution => "Distribution Plot",
            ViewKind::BoxPlot => "Box Plot",
            ViewKind::ValueCounts => "Value Counts",
        }
    }

    /// Whether the view only makes sense on numeric columns.
    pub fn requires_numeric(self) -> bool {
        matches!(self, ViewKind::Distribution | ViewKind::BoxPlot)
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViewKind {
    type Err = ExploreError;

    /// Accepts the labels ("Box Plot") as well as snake/kebab case ("box_plot").
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "summary_statistics" | "summary_stats" | "summary" | "stats" => {
                Ok(ViewKind::SummaryStats)
            }
            "null_percentage" | "null_pct" | "nulls" => Ok(ViewKind::NullPercentage),
            "distribution_plot" | "distribution" | "histogram" => Ok(ViewKind::Distribution),
            "box_plot" | "boxplot" | "box" => Ok(ViewKind::BoxPlot),
            "value_counts" | "counts" => Ok(ViewKind::ValueCounts),
            _ => Err(ExploreError::InvalidConfig(format!(
                "unknown view kind '{}'",
                s
            ))),
        }
    }
}

/// One histogram bucket `[start, end)`; the last bucket is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// A derived representation of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ColumnView {
    SummaryStats {
        summary: ColumnSummary,
    },
    NullPercentage {
        column: String,
        percentage: f64,
    },
    Distribution {
        column: String,
        sample: Vec<f64>,
        bins: Vec<HistogramBin>,
    },
    BoxPlot {
        column: String,
        sample: Vec<f64>,
        summary: Option<BoxPlotSummary>,
    },
    ValueCounts {
        column: String,
        /// Distinct values with counts, descending by count, ties first-seen.
        counts: Vec<(String, usize)>,
    },
}

impl ColumnView {
    pub fn kind(&self) -> ViewKind {
        match self {
            ColumnView::SummaryStats { .. } => ViewKind::SummaryStats,
            ColumnView::NullPercentage { .. } => ViewKind::NullPercentage,
            ColumnView::Distribution { .. } => ViewKind::Distribution,
            ColumnView::BoxPlot { .. } => ViewKind::BoxPlot,
            ColumnView::ValueCounts { .. } => ViewKind::ValueCounts,
        }
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Keep rows whose value in `column` is one of `values`.
///
/// An empty `values` list means "no filter selected" and keeps every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub column: String,
    pub values: Vec<CellKey>,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, values: Vec<CellKey>) -> Self {
        Self {
            column: column.into(),
            values,
        }
    }

    /// Build a filter from plain text values.
    pub fn from_values<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(column, values.into_iter().map(CellKey::value).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// Cleaning
// ============================================================================

/// What a cleaning pass did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates_removed: usize,
    pub imputations: Vec<Imputation>,
}

/// Median imputation applied to one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputation {
    pub column: String,
    pub median: f64,
    pub filled: usize,
}

// ============================================================================
// Analysis Options
// ============================================================================

/// The selectable analysis operations, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOption {
    RawData,
    Clean,
    FilterByView,
    ExploratoryAnalysis,
    NarrativeAnalysis,
    NullPercentage,
    ColumnView,
}

impl AnalysisOption {
    /// The options selected when the user has not chosen any.
    pub const DEFAULTS: [AnalysisOption; 5] = [
        AnalysisOption::RawData,
        AnalysisOption::ExploratoryAnalysis,
        AnalysisOption::NullPercentage,
        AnalysisOption::ColumnView,
        AnalysisOption::FilterByView,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnalysisOption::RawData => "Raw Data",
            AnalysisOption::Clean => "Cleaned Data",
            AnalysisOption::FilterByView => "Filter by View",
            AnalysisOption::ExploratoryAnalysis => "Exploratory Data Analysis",
            AnalysisOption::NarrativeAnalysis => "Narrative Analysis",
            AnalysisOption::NullPercentage => "Null Percentage Analysis",
            AnalysisOption::ColumnView => "Column View",
        }
    }
}

impl fmt::Display for AnalysisOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let df = df![
            "age" => [Some(25i64), None, Some(30)],
            "city" => [Some("A"), Some("B"), None],
        ]
        .unwrap();
        Table::new(df)
    }

    #[test]
    fn test_table_classifies_columns() {
        let table = sample_table();
        assert_eq!(table.kind("age").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.kind("city").unwrap(), ColumnKind::Text);
        assert_eq!(table.numeric_columns(), vec!["age".to_string()]);
    }

    #[test]
    fn test_table_unknown_column() {
        let table = sample_table();
        assert!(matches!(
            table.kind("nope"),
            Err(ExploreError::ColumnNotFound(_))
        ));
        assert!(table.series("nope").is_err());
        assert!(table.ensure_columns(&["age", "nope"]).is_err());
    }

    #[test]
    fn test_table_equality_treats_missing_as_equal() {
        assert_eq!(sample_table(), sample_table());
        let other = Table::new(df!["age" => [Some(25i64), None, Some(31)]].unwrap());
        assert_ne!(sample_table(), other);
    }

    #[test]
    fn test_preview_renders_missing_as_none() {
        let preview = sample_table().preview(2).unwrap();
        assert_eq!(preview.columns, vec!["age", "city"]);
        assert_eq!(preview.total_rows, 3);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[1][0], None);
        assert_eq!(preview.rows[1][1], Some("B".to_string()));
    }

    #[test]
    fn test_view_kind_from_str() {
        assert_eq!("Box Plot".parse::<ViewKind>().unwrap(), ViewKind::BoxPlot);
        assert_eq!(
            "value-counts".parse::<ViewKind>().unwrap(),
            ViewKind::ValueCounts
        );
        assert_eq!(
            "Distribution Plot".parse::<ViewKind>().unwrap(),
            ViewKind::Distribution
        );
        assert!("pie".parse::<ViewKind>().is_err());
        for kind in ViewKind::ALL {
            assert_eq!(kind.label().parse::<ViewKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_null_report_lookup() {
        let report = NullReport {
            group_columns: vec!["city".to_string()],
            feature_columns: vec!["age".to_string()],
            rows: vec![NullReportRow {
                group_key: Some(vec![CellKey::value("A")]),
                row_count: 2,
                percentages: vec![50.0],
            }],
        };
        assert_eq!(
            report.percentage(Some(&[CellKey::value("A")]), "age"),
            Some(50.0)
        );
        assert_eq!(report.percentage(None, "age"), None);
    }

    #[test]
    fn test_analysis_options_sorted_in_execution_order() {
        let mut options = AnalysisOption::DEFAULTS.to_vec();
        options.sort();
        assert_eq!(options.first(), Some(&AnalysisOption::RawData));
        assert_eq!(options.last(), Some(&AnalysisOption::ColumnView));
    }
}
