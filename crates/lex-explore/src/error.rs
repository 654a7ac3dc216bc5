//! Custom error types for the exploration engine.
//!
//! This module provides the error hierarchy using `thiserror`. Every failure
//! an analysis section can produce is one of these variants, so the session
//! layer can turn any of them into a user-visible notice.
//!
//! Errors are serializable so a presentation layer (or the CLI's `--json`
//! mode) can ship them as `{code, message}` objects.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Reasons an uploaded byte stream could not be turned into a table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The input contained no data at all.
    #[error("No columns to parse from input")]
    Empty,

    /// The input is not valid UTF-8 text.
    #[error("Input is not valid UTF-8 (first invalid byte at offset {offset})")]
    Encoding { offset: usize },

    /// A record has a different number of fields than the header.
    #[error("Line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A quoted field was opened but never closed.
    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    /// The CSV reader rejected the input.
    #[error("Failed to parse CSV: {0}")]
    Parse(String),
}

/// The main error type for the exploration engine.
#[derive(Error, Debug)]
pub enum ExploreError {
    /// Input could not be loaded.
    #[error("Error loading data: {0}")]
    Load(#[from] LoadError),

    /// A view was requested on a column whose type does not support it.
    #[error("{view} is only available for numeric columns ('{column}' is {dtype})")]
    UnsupportedOperation {
        view: String,
        column: String,
        dtype: String,
    },

    /// The narrative generation client failed.
    #[error("Narrative service error: {0}")]
    ExternalService(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ExploreError>,
    },
}

impl ExploreError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ExploreError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build an [`ExploreError::UnsupportedOperation`].
    pub fn unsupported(
        view: impl Into<String>,
        column: impl Into<String>,
        dtype: impl Into<String>,
    ) -> Self {
        ExploreError::UnsupportedOperation {
            view: view.into(),
            column: column.into(),
            dtype: dtype.into(),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Load(_) => "LOAD_ERROR",
            Self::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Strip any context wrappers and return the underlying error.
    pub fn root(&self) -> &ExploreError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error is the "view not available for this column type" case.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.root(), Self::UnsupportedOperation { .. })
    }

    /// Check if this error is recoverable (the user can fix it by changing a selection).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.root(),
            Self::UnsupportedOperation { .. }
                | Self::ColumnNotFound(_)
                | Self::InvalidConfig(_)
                | Self::ExternalService(_)
        )
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ExploreError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ExploreError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

static_assertions::assert_impl_all!(ExploreError: Send, Sync, std::error::Error);

/// Result type alias for exploration operations.
pub type Result<T> = std::result::Result<T, ExploreError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ExploreError::Polars(e).with_context(context))
    }
}
