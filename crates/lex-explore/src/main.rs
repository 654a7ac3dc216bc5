//! CLI entry point for the exploration engine.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use lex_explore::ai::AIProvider;
use lex_explore::reporting::outcome_text;
use lex_explore::{
    AnalysisOption, AnalysisReport, AnalysisRequest, AnalysisRun, AnalysisState, ExploreError,
    ExplorerConfig, FilterSpec, Notice, ViewKind, run_analysis,
};
use std::path::Path;
use tracing::{debug, info, warn};

#[cfg(feature = "ai")]
use lex_explore::ai::{OllamaConfig, OllamaProvider, OpenRouterConfig, OpenRouterProvider};

/// CLI-compatible analysis option enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAnalysisOption {
    /// Preview the uploaded table
    RawData,
    /// Drop duplicate rows and fill numeric gaps with the median
    Clean,
    /// Keep rows matching --filter-column / --filter-values
    Filter,
    /// Column info, summary statistics, correlations
    Eda,
    /// LLM-written summary of the statistics
    Narrative,
    /// Missing-value percentages, optionally grouped
    NullPercentage,
    /// One view of one column (see --column and --view)
    ColumnView,
}

impl From<CliAnalysisOption> for AnalysisOption {
    fn from(cli: CliAnalysisOption) -> Self {
        match cli {
            CliAnalysisOption::RawData => AnalysisOption::RawData,
            CliAnalysisOption::Clean => AnalysisOption::Clean,
            CliAnalysisOption::Filter => AnalysisOption::FilterByView,
            CliAnalysisOption::Eda => AnalysisOption::ExploratoryAnalysis,
            CliAnalysisOption::Narrative => AnalysisOption::NarrativeAnalysis,
            CliAnalysisOption::NullPercentage => AnalysisOption::NullPercentage,
            CliAnalysisOption::ColumnView => AnalysisOption::ColumnView,
        }
    }
}

/// CLI-compatible column view enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliViewKind {
    /// count, mean, std and quartiles (or top/freq for text)
    Summary,
    /// Share of missing values
    Nulls,
    /// Histogram of a numeric column
    Distribution,
    /// Quartiles, whiskers and outliers of a numeric column
    BoxPlot,
    /// Frequency of each distinct value
    ValueCounts,
}

impl From<CliViewKind> for ViewKind {
    fn from(cli: CliViewKind) -> Self {
        match cli {
            CliViewKind::Summary => ViewKind::SummaryStats,
            CliViewKind::Nulls => ViewKind::NullPercentage,
            CliViewKind::Distribution => ViewKind::Distribution,
            CliViewKind::BoxPlot => ViewKind::BoxPlot,
            CliViewKind::ValueCounts => ViewKind::ValueCounts,
        }
    }
}

/// Which service writes the narrative summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliProvider {
    /// Local Ollama server (OLLAMA_HOST, default http://localhost:11434)
    Ollama,
    /// OpenRouter API (needs OPENROUTER_API_KEY)
    OpenRouter,
    /// No narrative provider
    None,
}

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Exploratory Data Analysis for CSV files",
    long_about = "Load a CSV file, optionally clean and filter it, and print profiling results.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  OLLAMA_HOST           Ollama server address (narrative analysis)\n  \
                  OPENROUTER_API_KEY    API key for OpenRouter (narrative analysis)\n\n\
                  EXAMPLES:\n  \
                  # Default sections (raw data, EDA, null percentage, column view, filter)\n  \
                  lex-explore -i data.csv\n\n  \
                  # Clean, then show value counts of one column\n  \
                  lex-explore -i data.csv --options clean,column-view --column city --view value-counts\n\n  \
                  # Missing values grouped by a column\n  \
                  lex-explore -i data.csv --options null-percentage --group-by city\n\n  \
                  # Only rows of two cities, as JSON\n  \
                  lex-explore -i data.csv --options filter,eda --filter-column city --filter-values A,B --json"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: String,

    /// Analysis sections to run (comma separated)
    ///
    /// Sections always run in a fixed order: raw data, clean, filter, eda,
    /// narrative, null percentage, column view. Defaults to raw data, eda,
    /// null percentage, column view and filter.
    #[arg(long, value_enum, value_delimiter = ',')]
    options: Vec<CliAnalysisOption>,

    /// Grouping columns for the null percentage section
    #[arg(long, value_delimiter = ',')]
    group_by: Vec<String>,

    /// Features for the null percentage section (default: every column)
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,

    /// Column for the column view section (default: first column)
    #[arg(long)]
    column: Option<String>,

    /// View for the column view section
    #[arg(long, value_enum, default_value = "summary")]
    view: CliViewKind,

    /// Column to filter on
    #[arg(long)]
    filter_column: Option<String>,

    /// Values to keep in --filter-column (comma separated)
    #[arg(long, value_delimiter = ',')]
    filter_values: Vec<String>,

    /// Narrative provider
    #[arg(long, value_enum, default_value = "ollama")]
    provider: CliProvider,

    /// Model name passed to the narrative provider
    #[arg(long)]
    model: Option<String>,

    /// Narrative request timeout in seconds (default: wait indefinitely)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Rows shown in table previews
    #[arg(long, default_value = "5")]
    head_rows: usize,

    /// Output directory for reports
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Output JSON to stdout instead of human-readable sections
    ///
    /// Disables all logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress logs below warn
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = ExplorerConfig::builder().head_rows(args.head_rows).build()?;
    let request = build_request(&args);
    let options: Vec<AnalysisOption> = request.options.iter().copied().collect();

    info!("Loading dataset from: {}", args.input);
    let bytes = std::fs::read(&args.input)?;
    let state = match AnalysisState::new().start().load(&bytes, &config) {
        Ok(state) => state,
        Err(e) => {
            let error = ExploreError::from(e);
            if args.json {
                let run = AnalysisRun {
                    notices: vec![Notice::failed(&error)],
                    sections: Vec::new(),
                };
                let report = AnalysisReport::build(&args.input, None, &options, run);
                println!("{}", report.to_json()?);
            }
            return Err(anyhow!(error));
        }
    };
    let shape = state.raw().map(|t| (t.height(), t.width()));
    info!("Dataset loaded: {:?}", shape);

    let provider = if request.options.contains(&AnalysisOption::NarrativeAnalysis) {
        build_provider(&args)?
    } else {
        None
    };

    let (_state, run) = run_analysis(state, &request, provider.as_deref(), &config);
    let report = AnalysisReport::build(&args.input, shape, &options, run);

    if report.failure_count() > 0 {
        warn!("{} section(s) failed", report.failure_count());
    }

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    if args.emit_report {
        let report_path = report.write_to_file(Path::new(&args.output), &file_stem(&args.input))?;
        info!("Report written to: {}", report_path.display());
    }

    print_report(&report);
    Ok(())
}

/// Translate the flags into one analysis request.
fn build_request(args: &Args) -> AnalysisRequest {
    let mut request = if args.options.is_empty() {
        AnalysisRequest::default()
    } else {
        AnalysisRequest::new(args.options.iter().copied().map(AnalysisOption::from))
    };

    request = request.group_by(args.group_by.clone());
    if let Some(features) = &args.features {
        request = request.features(features.clone());
    }
    if let Some(column) = &args.column {
        request = request.column_view(column.clone(), args.view.into());
    }
    if let Some(column) = &args.filter_column {
        request = request.filter(FilterSpec::from_values(
            column.clone(),
            args.filter_values.iter().cloned(),
        ));
    }

    debug!("Analysis request: {:?}", request);
    request
}

/// Build the narrative provider selected on the command line.
#[cfg(feature = "ai")]
fn build_provider(args: &Args) -> Result<Option<Box<dyn AIProvider>>> {
    match args.provider {
        CliProvider::None => Ok(None),
        CliProvider::Ollama => {
            let mut builder = OllamaConfig::builder();
            if let Some(model) = &args.model {
                builder = builder.model(model);
            }
            if let Some(secs) = args.timeout_secs {
                builder = builder.timeout_secs(secs);
            }
            let provider = OllamaProvider::with_config(builder.build())?;
            info!("Narrative provider: Ollama");
            Ok(Some(Box::new(provider)))
        }
        CliProvider::OpenRouter => {
            let mut builder = OpenRouterConfig::builder();
            if let Some(model) = &args.model {
                builder = builder.model(model);
            }
            if let Some(secs) = args.timeout_secs {
                builder = builder.timeout_secs(secs);
            }
            match OpenRouterProvider::from_env(builder.build()) {
                Ok(provider) => {
                    info!("Narrative provider: OpenRouter");
                    Ok(Some(Box::new(provider)))
                }
                Err(e) => {
                    warn!("{}. Narrative analysis will be skipped.", e);
                    Ok(None)
                }
            }
        }
    }
}

/// Fallback when the "ai" feature is disabled
#[cfg(not(feature = "ai"))]
fn build_provider(args: &Args) -> Result<Option<Box<dyn AIProvider>>> {
    if args.provider != CliProvider::None {
        warn!("AI support not compiled in. Narrative analysis will be skipped.");
        warn!("Compile with --features ai to enable AI support.");
    }
    Ok(None)
}

/// Extract the file stem (name without extension) from a path.
fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print every section of the report.
///
/// Uses `println!` intentionally: this is the command's output, not logging.
fn print_report(report: &AnalysisReport) {
    println!("{}", "=".repeat(80));
    match report.shape {
        Some((rows, cols)) => println!("{} ({} rows x {} columns)", report.input_file, rows, cols),
        None => println!("{}", report.input_file),
    }
    println!("{}", "=".repeat(80));

    for notice in &report.notices {
        println!("note: {}", notice);
    }
    for outcome in &report.sections {
        println!();
        print!("{}", outcome_text(outcome));
    }
}
