//! Error taxonomy for loading and joining the valve data

use miette::Diagnostic;
use thiserror::Error;

use crate::core::source::SourceError;

/// Errors that can occur while building or serving the relationship graph
///
/// Orphaned zone mapping rows are not represented here: they are counted
/// and logged by the joiner, never surfaced as failures.
#[derive(Debug, Error, Diagnostic)]
pub enum DataError {
    #[error("{sheet} must have a \"{column}\" column")]
    #[diagnostic(
        code(valves::schema),
        help("Check the header row of the {sheet}. Column names are matched after trimming whitespace.")
    )]
    Schema { sheet: String, column: String },

    #[error("{sheet} is empty")]
    #[diagnostic(
        code(valves::empty_source),
        help("Add at least one valve row below the header row.")
    )]
    EmptySource { sheet: String },

    #[error("Failed to process valve data: {0}")]
    #[diagnostic(code(valves::join))]
    Join(#[source] SourceError),

    #[error("Valve data is unavailable: {message}")]
    #[diagnostic(
        code(valves::data_source),
        help("No cached data exists yet, so the failed fetch cannot fall back to stale data.")
    )]
    DataSource {
        message: String,
        #[source]
        source: Box<DataError>,
    },
}

impl DataError {
    /// Stable machine-readable kind, used in structured (JSON) failures
    pub fn kind(&self) -> &'static str {
        match self {
            DataError::Schema { .. } => "schema",
            DataError::EmptySource { .. } => "empty_source",
            DataError::Join(_) => "join",
            DataError::DataSource { .. } => "data_source",
        }
    }

    pub(crate) fn missing_column(sheet: &str, column: &str) -> Self {
        DataError::Schema {
            sheet: sheet.to_string(),
            column: column.to_string(),
        }
    }

    pub(crate) fn empty(sheet: &str) -> Self {
        DataError::EmptySource {
            sheet: sheet.to_string(),
        }
    }

    /// Wrap a refresh failure that had no cached data to fall back on
    pub(crate) fn unavailable(cause: DataError) -> Self {
        DataError::DataSource {
            message: cause.to_string(),
            source: Box::new(cause),
        }
    }
}
