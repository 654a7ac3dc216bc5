//! Interactive session handling.
//!
//! [`AnalysisState`] is the whole application state: the uploaded table, the
//! table the last run ended with, and whether the user has left the landing
//! screen. [`run_analysis`] takes the state by value, runs the selected
//! [`AnalysisOption`]s in their fixed order and hands the state back together
//! with one [`SectionOutcome`] per option.
//!
//! Every run starts again from the uploaded table:
//!
//! ```text
//! raw -> [Clean] -> [FilterByView] -> ExploratoryAnalysis / NarrativeAnalysis
//!                                     / NullPercentage / ColumnView
//! ```
//!
//! A failing section never stops the run. Its error becomes a [`Notice`] and
//! later sections see the table as it was before the failure.

use crate::ai::AIProvider;
use crate::cleaner::DataCleaner;
use crate::config::ExplorerConfig;
use crate::error::{ExploreError, LoadError, Result};
use crate::filter::{filter, filter_options};
use crate::loader::load_with_config;
use crate::narrative;
use crate::profiler::DataProfiler;
use crate::reporting::summary_text;
use crate::types::{
    AnalysisOption, CellKey, CleaningReport, ColumnView, FilterSpec, NullReport, Overview, Table,
    TablePreview, ViewKind,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

// ============================================================================
// State
// ============================================================================

/// Application state carried between interactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    analysis_started: bool,
    raw: Option<Table>,
    current: Option<Table>,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave the landing screen.
    pub fn start(mut self) -> Self {
        self.analysis_started = true;
        self
    }

    pub fn is_started(&self) -> bool {
        self.analysis_started
    }

    /// Replace the uploaded table.
    pub fn with_table(mut self, table: Table) -> Self {
        self.current = Some(table.clone());
        self.raw = Some(table);
        self
    }

    /// Parse an upload and make it the session's table.
    ///
    /// On failure the previous state is dropped along with the bad upload;
    /// the caller shows the error and keeps its own copy if it needs one.
    pub fn load(self, bytes: &[u8], config: &ExplorerConfig) -> std::result::Result<Self, LoadError> {
        let table = load_with_config(bytes, config)?;
        Ok(self.with_table(table))
    }

    /// The table as uploaded.
    pub fn raw(&self) -> Option<&Table> {
        self.raw.as_ref()
    }

    /// The table the last run ended with (after cleaning and filtering).
    pub fn current(&self) -> Option<&Table> {
        self.current.as_ref()
    }
}

static_assertions::assert_impl_all!(AnalysisState: Send, Sync, Clone);

// ============================================================================
// Request
// ============================================================================

/// Column and view picked for the column-view section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSelection {
    pub column: String,
    pub view: ViewKind,
}

/// Everything the user picked for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub options: BTreeSet<AnalysisOption>,
    /// Grouping columns for the null percentage section.
    pub group_by: Vec<String>,
    /// Features for the null percentage section; `None` means every column.
    pub features: Option<Vec<String>>,
    /// `None` shows summary statistics of the first column.
    pub column_view: Option<ColumnSelection>,
    /// `None` keeps the full table.
    pub filter: Option<FilterSpec>,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self::new(AnalysisOption::DEFAULTS)
    }
}

impl AnalysisRequest {
    pub fn new(options: impl IntoIterator<Item = AnalysisOption>) -> Self {
        Self {
            options: options.into_iter().collect(),
            group_by: Vec::new(),
            features: None,
            column_view: None,
            filter: None,
        }
    }

    pub fn group_by(mut self, columns: Vec<String>) -> Self {
        self.group_by = columns;
        self
    }

    pub fn features(mut self, columns: Vec<String>) -> Self {
        self.features = Some(columns);
        self
    }

    pub fn column_view(mut self, column: impl Into<String>, view: ViewKind) -> Self {
        self.column_view = Some(ColumnSelection {
            column: column.into(),
            view,
        });
        self
    }

    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filter = Some(spec);
        self
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Output of a section that ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum Section {
    RawData {
        table: TablePreview,
    },
    Cleaned {
        table: TablePreview,
        report: CleaningReport,
    },
    Filtered {
        column: String,
        values: Vec<CellKey>,
        table: TablePreview,
    },
    Exploratory {
        overview: Box<Overview>,
    },
    Narrative {
        provider: String,
        model: Option<String>,
        text: String,
    },
    NullPercentage {
        report: NullReport,
    },
    ColumnView {
        view: ColumnView,
    },
}

/// Something the user should be told instead of (or next to) a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    /// The landing screen has not been left yet.
    NotStarted,
    /// Nothing has been uploaded.
    NoDataLoaded,
    /// A section needs at least one selected item.
    EmptySelection { what: String },
    /// No filter values picked; the full table is kept.
    NoFilterSelected { column: Option<String> },
    /// The filter column holds no values to pick from.
    NoFilterValues { column: String },
    /// Narrative analysis was selected without a configured provider.
    NoProvider,
    /// The section failed.
    Failed { code: String, message: String },
}

impl Notice {
    pub fn failed(error: &ExploreError) -> Self {
        Notice::Failed {
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NotStarted => write!(f, "Start the analysis to continue."),
            Notice::NoDataLoaded => write!(f, "Please upload a CSV file to begin analysis."),
            Notice::EmptySelection { what } => {
                write!(f, "Please select at least one {} to analyze.", what)
            }
            Notice::NoFilterSelected { .. } => {
                write!(f, "No values selected. Showing the full dataset.")
            }
            Notice::NoFilterValues { column } => {
                write!(f, "No unique values found in '{}'.", column)
            }
            Notice::NoProvider => write!(f, "No narrative provider configured."),
            Notice::Failed { message, .. } => write!(f, "{}", message),
        }
    }
}

/// What one selected option produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOutcome {
    pub option: AnalysisOption,
    pub section: Option<Section>,
    pub notices: Vec<Notice>,
}

impl SectionOutcome {
    fn shown(option: AnalysisOption, section: Section) -> Self {
        Self {
            option,
            section: Some(section),
            notices: Vec::new(),
        }
    }

    fn notice(option: AnalysisOption, notice: Notice) -> Self {
        Self {
            option,
            section: None,
            notices: vec![notice],
        }
    }

    fn from_result(option: AnalysisOption, result: Result<Section>) -> Self {
        match result {
            Ok(section) => Self::shown(option, section),
            Err(e) => {
                warn!("{} failed: {}", option, e);
                Self::notice(option, Notice::failed(&e))
            }
        }
    }

    /// Whether the section failed outright.
    pub fn is_failure(&self) -> bool {
        self.notices
            .iter()
            .any(|n| matches!(n, Notice::Failed { .. }))
    }
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRun {
    /// Notices that stopped the run before any section (no data, not started).
    pub notices: Vec<Notice>,
    pub sections: Vec<SectionOutcome>,
}

static_assertions::assert_impl_all!(AnalysisRun: Send, Sync);

// ============================================================================
// Handler
// ============================================================================

/// Run the selected options against the uploaded table.
pub fn run_analysis(
    mut state: AnalysisState,
    request: &AnalysisRequest,
    provider: Option<&dyn AIProvider>,
    config: &ExplorerConfig,
) -> (AnalysisState, AnalysisRun) {
    if !state.analysis_started {
        debug!("Analysis requested before the session started");
        return (state, stopped(Notice::NotStarted));
    }
    let Some(raw) = state.raw.clone() else {
        return (state, stopped(Notice::NoDataLoaded));
    };

    info!(
        "Running {} analysis option(s) on {} rows",
        request.options.len(),
        raw.height()
    );

    let mut table = raw;
    let mut sections = Vec::with_capacity(request.options.len());

    for &option in &request.options {
        let outcome = match option {
            AnalysisOption::RawData => SectionOutcome::from_result(option, raw_section(&table)),
            AnalysisOption::Clean => match clean_section(&table) {
                Ok((cleaned, section)) => {
                    table = cleaned;
                    SectionOutcome::shown(option, section)
                }
                Err(e) => SectionOutcome::from_result(option, Err(e)),
            },
            AnalysisOption::FilterByView => {
                let (filtered, outcome) = filter_section(&table, request.filter.as_ref());
                if let Some(filtered) = filtered {
                    table = filtered;
                }
                outcome
            }
            AnalysisOption::ExploratoryAnalysis => SectionOutcome::from_result(
                option,
                DataProfiler::overview(&table, config).map(|overview| Section::Exploratory {
                    overview: Box::new(overview),
                }),
            ),
            AnalysisOption::NarrativeAnalysis => match provider {
                Some(provider) => {
                    SectionOutcome::from_result(option, narrative_section(&table, provider))
                }
                None => SectionOutcome::notice(option, Notice::NoProvider),
            },
            AnalysisOption::NullPercentage => null_section(&table, request),
            AnalysisOption::ColumnView => column_view_section(&table, request, config),
        };
        sections.push(outcome);
    }

    state.current = Some(table);
    (
        state,
        AnalysisRun {
            notices: Vec::new(),
            sections,
        },
    )
}

fn stopped(notice: Notice) -> AnalysisRun {
    AnalysisRun {
        notices: vec![notice],
        sections: Vec::new(),
    }
}

fn full_preview(table: &Table) -> Result<TablePreview> {
    table.preview(table.height())
}

fn raw_section(table: &Table) -> Result<Section> {
    Ok(Section::RawData {
        table: full_preview(table)?,
    })
}

fn clean_section(table: &Table) -> Result<(Table, Section)> {
    let (cleaned, report) = DataCleaner::clean_with_report(table)?;
    let section = Section::Cleaned {
        table: full_preview(&cleaned)?,
        report,
    };
    Ok((cleaned, section))
}

fn filter_section(table: &Table, spec: Option<&FilterSpec>) -> (Option<Table>, SectionOutcome) {
    let option = AnalysisOption::FilterByView;
    let Some(spec) = spec else {
        return (
            None,
            SectionOutcome::notice(option, Notice::NoFilterSelected { column: None }),
        );
    };

    if spec.is_empty() {
        let notice = match filter_options(table, &spec.column) {
            Ok(options) if options.is_empty() => Notice::NoFilterValues {
                column: spec.column.clone(),
            },
            Ok(_) => Notice::NoFilterSelected {
                column: Some(spec.column.clone()),
            },
            Err(e) => Notice::failed(&e),
        };
        return (None, SectionOutcome::notice(option, notice));
    }

    let result = filter(table, spec).and_then(|filtered| {
        let section = Section::Filtered {
            column: spec.column.clone(),
            values: spec.values.clone(),
            table: full_preview(&filtered)?,
        };
        Ok((filtered, section))
    });

    match result {
        Ok((filtered, section)) => (Some(filtered), SectionOutcome::shown(option, section)),
        Err(e) => (None, SectionOutcome::from_result(option, Err(e))),
    }
}

fn narrative_section(table: &Table, provider: &dyn AIProvider) -> Result<Section> {
    let stats = summary_text(&DataProfiler::describe(table)?);
    let text = narrative::summarize(&stats, provider)?;
    Ok(Section::Narrative {
        provider: provider.name().to_string(),
        model: provider.model().map(str::to_string),
        text,
    })
}

fn null_section(table: &Table, request: &AnalysisRequest) -> SectionOutcome {
    let option = AnalysisOption::NullPercentage;
    let features = request
        .features
        .clone()
        .unwrap_or_else(|| table.column_names());

    if features.is_empty() {
        return SectionOutcome::notice(
            option,
            Notice::EmptySelection {
                what: "feature".to_string(),
            },
        );
    }

    SectionOutcome::from_result(
        option,
        DataProfiler::null_percentage(table, &request.group_by, &features)
            .map(|report| Section::NullPercentage { report }),
    )
}

fn column_view_section(
    table: &Table,
    request: &AnalysisRequest,
    config: &ExplorerConfig,
) -> SectionOutcome {
    let option = AnalysisOption::ColumnView;
    let selection = match &request.column_view {
        Some(selection) => selection.clone(),
        None => match table.column_names().into_iter().next() {
            Some(column) => ColumnSelection {
                column,
                view: ViewKind::SummaryStats,
            },
            None => {
                return SectionOutcome::notice(
                    option,
                    Notice::EmptySelection {
                        what: "column".to_string(),
                    },
                );
            }
        },
    };

    SectionOutcome::from_result(
        option,
        DataProfiler::column_view(table, &selection.column, selection.view, config)
            .map(|view| Section::ColumnView { view }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    struct CannedProvider(std::result::Result<&'static str, &'static str>);

    impl AIProvider for CannedProvider {
        fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            self.0.map(str::to_string).map_err(|e| anyhow!(e))
        }

        fn name(&self) -> &str {
            "Canned"
        }
    }

    fn scenario_state() -> AnalysisState {
        let table = Table::new(
            df![
                "age" => [Some(25i64), None, Some(25), Some(25)],
                "city" => ["A", "A", "B", "A"],
            ]
            .unwrap(),
        );
        AnalysisState::new().start().with_table(table)
    }

    fn run(state: AnalysisState, request: &AnalysisRequest) -> (AnalysisState, AnalysisRun) {
        run_analysis(state, request, None, &ExplorerConfig::default())
    }

    fn section(run: &AnalysisRun, option: AnalysisOption) -> &SectionOutcome {
        run.sections
            .iter()
            .find(|s| s.option == option)
            .expect("section present")
    }

    #[test]
    fn test_not_started() {
        let state = AnalysisState::new();
        let (state, result) = run(state, &AnalysisRequest::default());
        assert!(!state.is_started());
        assert_eq!(result.notices, vec![Notice::NotStarted]);
        assert!(result.sections.is_empty());
    }

    #[test]
    fn test_no_data_loaded() {
        let (_, result) = run(AnalysisState::new().start(), &AnalysisRequest::default());
        assert_eq!(result.notices, vec![Notice::NoDataLoaded]);
    }

    #[test]
    fn test_load_sets_raw_and_current() {
        let state = AnalysisState::new()
            .start()
            .load(b"a,b\n1,x\n", &ExplorerConfig::default())
            .unwrap();
        assert_eq!(state.raw().unwrap().height(), 1);
        assert_eq!(state.raw(), state.current());
    }

    #[test]
    fn test_sections_run_in_fixed_order() {
        let request = AnalysisRequest::new([
            AnalysisOption::ColumnView,
            AnalysisOption::RawData,
            AnalysisOption::Clean,
        ]);
        let (_, result) = run(scenario_state(), &request);
        let order: Vec<_> = result.sections.iter().map(|s| s.option).collect();
        assert_eq!(
            order,
            vec![
                AnalysisOption::RawData,
                AnalysisOption::Clean,
                AnalysisOption::ColumnView
            ]
        );
    }

    #[test]
    fn test_clean_then_grouped_nulls() {
        let request = AnalysisRequest::new([AnalysisOption::Clean, AnalysisOption::NullPercentage])
            .group_by(vec!["city".to_string()])
            .features(vec!["age".to_string()]);
        let (state, result) = run(scenario_state(), &request);

        assert_eq!(state.current().unwrap().height(), 3);
        assert_eq!(state.raw().unwrap().height(), 4);

        let Some(Section::NullPercentage { report }) =
            &section(&result, AnalysisOption::NullPercentage).section
        else {
            panic!("expected null report");
        };
        assert_eq!(report.percentage(Some(&[CellKey::value("A")]), "age"), Some(0.0));
        assert_eq!(report.percentage(Some(&[CellKey::value("B")]), "age"), Some(0.0));
    }

    #[test]
    fn test_each_run_starts_from_raw_table() {
        let request = AnalysisRequest::new([AnalysisOption::Clean]);
        let (state, _) = run(scenario_state(), &request);
        let (state, _) = run(state, &AnalysisRequest::new([AnalysisOption::RawData]));
        assert_eq!(state.current().unwrap().height(), 4);
    }

    #[test]
    fn test_failure_does_not_stop_other_sections() {
        let request = AnalysisRequest::new([
            AnalysisOption::ColumnView,
            AnalysisOption::NullPercentage,
            AnalysisOption::ExploratoryAnalysis,
        ])
        .column_view("city", ViewKind::Distribution);
        let (_, result) = run(scenario_state(), &request);

        let view = section(&result, AnalysisOption::ColumnView);
        assert!(view.is_failure());
        assert!(matches!(
            &view.notices[0],
            Notice::Failed { code, .. } if code == "UNSUPPORTED_OPERATION"
        ));
        assert!(section(&result, AnalysisOption::NullPercentage).section.is_some());
        assert!(section(&result, AnalysisOption::ExploratoryAnalysis).section.is_some());
    }

    #[test]
    fn test_empty_feature_selection_is_a_notice() {
        let request = AnalysisRequest::new([AnalysisOption::NullPercentage]).features(vec![]);
        let (_, result) = run(scenario_state(), &request);
        let outcome = section(&result, AnalysisOption::NullPercentage);
        assert_eq!(
            outcome.notices,
            vec![Notice::EmptySelection {
                what: "feature".to_string()
            }]
        );
        assert!(!outcome.is_failure());
    }

    #[test]
    fn test_default_null_features_cover_every_column() {
        let request = AnalysisRequest::new([AnalysisOption::NullPercentage]);
        let (_, result) = run(scenario_state(), &request);
        let Some(Section::NullPercentage { report }) =
            &section(&result, AnalysisOption::NullPercentage).section
        else {
            panic!("expected null report");
        };
        assert_eq!(report.feature_columns, vec!["age", "city"]);
        assert_eq!(report.percentage(None, "age"), Some(25.0));
    }

    #[test]
    fn test_filter_feeds_later_sections() {
        let request = AnalysisRequest::new([
            AnalysisOption::FilterByView,
            AnalysisOption::ColumnView,
        ])
        .filter(FilterSpec::from_values("city", ["A"]))
        .column_view("city", ViewKind::ValueCounts);
        let (state, result) = run(scenario_state(), &request);

        assert_eq!(state.current().unwrap().height(), 3);
        let Some(Section::ColumnView {
            view: ColumnView::ValueCounts { counts, .. },
        }) = &section(&result, AnalysisOption::ColumnView).section
        else {
            panic!("expected value counts");
        };
        assert_eq!(counts, &vec![("A".to_string(), 3)]);
    }

    #[test]
    fn test_filter_without_values_keeps_full_table() {
        let request = AnalysisRequest::new([AnalysisOption::FilterByView])
            .filter(FilterSpec::new("city", vec![]));
        let (state, result) = run(scenario_state(), &request);
        assert_eq!(state.current().unwrap().height(), 4);
        assert_eq!(
            section(&result, AnalysisOption::FilterByView).notices,
            vec![Notice::NoFilterSelected {
                column: Some("city".to_string())
            }]
        );
    }

    #[test]
    fn test_filter_unknown_column_is_a_failure() {
        let request = AnalysisRequest::new([AnalysisOption::FilterByView, AnalysisOption::RawData])
            .filter(FilterSpec::from_values("nope", ["A"]));
        let (state, result) = run(scenario_state(), &request);
        assert!(section(&result, AnalysisOption::FilterByView).is_failure());
        assert_eq!(state.current().unwrap().height(), 4);
    }

    #[test]
    fn test_narrative_without_provider() {
        let request = AnalysisRequest::new([AnalysisOption::NarrativeAnalysis]);
        let (_, result) = run(scenario_state(), &request);
        assert_eq!(
            section(&result, AnalysisOption::NarrativeAnalysis).notices,
            vec![Notice::NoProvider]
        );
    }

    #[test]
    fn test_narrative_with_provider() {
        let request = AnalysisRequest::new([AnalysisOption::NarrativeAnalysis]);
        let provider = CannedProvider(Ok("Everyone is 25."));
        let (_, result) = run_analysis(
            scenario_state(),
            &request,
            Some(&provider),
            &ExplorerConfig::default(),
        );
        let Some(Section::Narrative { provider, text, .. }) =
            &section(&result, AnalysisOption::NarrativeAnalysis).section
        else {
            panic!("expected narrative");
        };
        assert_eq!(provider, "Canned");
        assert_eq!(text, "Everyone is 25.");
    }

    #[test]
    fn test_narrative_failure_is_external_service_notice() {
        let request = AnalysisRequest::new([
            AnalysisOption::NarrativeAnalysis,
            AnalysisOption::NullPercentage,
        ]);
        let provider = CannedProvider(Err("connection refused"));
        let (_, result) = run_analysis(
            scenario_state(),
            &request,
            Some(&provider),
            &ExplorerConfig::default(),
        );
        assert!(matches!(
            &section(&result, AnalysisOption::NarrativeAnalysis).notices[0],
            Notice::Failed { code, .. } if code == "EXTERNAL_SERVICE_ERROR"
        ));
        assert!(section(&result, AnalysisOption::NullPercentage).section.is_some());
    }

    #[test]
    fn test_no_options_selected() {
        let (state, result) = run(scenario_state(), &AnalysisRequest::new([]));
        assert!(result.sections.is_empty());
        assert!(result.notices.is_empty());
        assert_eq!(state.current().unwrap().height(), 4);
    }
}
