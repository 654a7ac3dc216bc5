//! Report generation module.
//!
//! Two renderings of a run:
//! - text for terminals ([`outcome_text`] and the per-result helpers)
//! - [`AnalysisReport`], serialized to JSON for `--json` output or written
//!   to a file with `--emit-report`
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_explore::reporting::{AnalysisReport, outcome_text};
//!
//! for outcome in &run.sections {
//!     print!("{}", outcome_text(outcome));
//! }
//!
//! let report = AnalysisReport::build("data.csv", Some(shape), &options, run);
//! println!("{}", report.to_json()?);
//! ```

mod report;
mod text;

pub use report::AnalysisReport;
pub use text::{
    column_view_text, correlation_text, info_text, null_report_text, outcome_text, preview_text,
    section_text, summary_text,
};
