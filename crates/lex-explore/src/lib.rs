//! Exploratory Data Analysis Library
//!
//! A small, AI-optional exploration engine for tabular data built with Rust and Polars.
//!
//! # Overview
//!
//! This library provides the building blocks of an interactive EDA session:
//!
//! - **Loading**: CSV bytes to a typed [`Table`], with strict validation of ragged input
//! - **Cleaning**: Duplicate removal and median imputation of numeric gaps
//! - **Profiling**: Column info, summary statistics, correlations, missing-value reports
//! - **Column Views**: Summary, null rate, distribution, box plot and value counts of one column
//! - **Filtering**: Keep rows whose value in one column is in a selected set
//! - **Narrative Summaries**: Optional LLM-generated prose about the summary statistics
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_explore::{
//!     run_analysis, AnalysisOption, AnalysisRequest, AnalysisState, ExplorerConfig, ViewKind,
//! };
//! use lex_explore::reporting::outcome_text;
//!
//! let config = ExplorerConfig::default();
//! let state = AnalysisState::new()
//!     .start()
//!     .load(&std::fs::read("data.csv")?, &config)?;
//!
//! let request = AnalysisRequest::new([
//!     AnalysisOption::Clean,
//!     AnalysisOption::ExploratoryAnalysis,
//!     AnalysisOption::ColumnView,
//! ])
//! .column_view("city", ViewKind::ValueCounts);
//!
//! let (state, run) = run_analysis(state, &request, None, &config);
//! for outcome in &run.sections {
//!     print!("{}", outcome_text(outcome));
//! }
//! ```
//!
//! The individual steps are available on their own as well:
//!
//! ```rust,ignore
//! use lex_explore::{clean, filter, load, DataProfiler, FilterSpec};
//!
//! let table = load(bytes)?;
//! let cleaned = clean(&table)?;
//! let only_a = filter(&cleaned, &FilterSpec::from_values("city", ["A"]))?;
//! let overview = DataProfiler::overview(&only_a, &ExplorerConfig::default())?;
//! ```
//!
//! # AI Providers
//!
//! Narrative analysis goes through the [`ai::AIProvider`] trait.
//! Implemented providers (behind the `ai` feature):
//!
//! - [`ai::OllamaProvider`] - local Ollama server
//! - [`ai::OpenRouterProvider`] - OpenRouter API
//!
//! To implement your own provider, see the [`ai`] module documentation.
//!
//! # Configuration
//!
//! Use [`ExplorerConfig`] to customize parsing and profiling:
//!
//! ```rust,ignore
//! use lex_explore::ExplorerConfig;
//!
//! let config = ExplorerConfig::builder()
//!     .head_rows(10)                  // Rows shown in previews
//!     .null_values(["NA", "-"])       // Tokens read as missing
//!     .histogram_bins(30)
//!     .pairplot_max_rows(500)         // Sample size for scatter data
//!     .sample_seed(7)
//!     .build()?;
//! ```

pub mod ai;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod filter;
pub mod imputers;
pub mod loader;
pub mod narrative;
pub mod profiler;
pub mod reporting;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, clean};
pub use config::{ConfigValidationError, ExplorerConfig, ExplorerConfigBuilder};
pub use error::{ExploreError, LoadError, Result as ExploreResult, ResultExt};
pub use filter::{filter, filter_options};
pub use imputers::StatisticalImputer;
pub use loader::{TableLoader, load, load_with_config};
pub use narrative::{build_prompt, summarize};
pub use profiler::DataProfiler;
pub use reporting::AnalysisReport;
pub use session::{
    AnalysisRequest, AnalysisRun, AnalysisState, ColumnSelection, Notice, Section,
    SectionOutcome, run_analysis,
};
pub use types::{
    AnalysisOption, BoxPlotSummary, CategoricalSummary, CellKey, CleaningReport, ColumnInfo,
    ColumnSummary, ColumnView, CorrelationMatrix, FilterSpec, HistogramBin, Imputation,
    NullReport, NullReportRow, NumericSummary, Overview, Pairplot, Table, TablePreview, ViewKind,
};
pub use utils::ColumnKind;

