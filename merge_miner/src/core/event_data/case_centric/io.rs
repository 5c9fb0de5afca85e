//! Errors, column configuration and the [`Importable`] implementation shared by the
//! [`EventLog`] importers

use std::io::Read;

use flate2::read::MultiGzDecoder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    constants::{ACTIVITY_NAME, CASE_CONCEPT_NAME, TIMESTAMP_NAME},
    event_log_csv::{import_event_log_csv, CSVImportOptions},
    EventLog,
};
use crate::core::io::Importable;

/// Error type for importing an [`EventLog`](super::EventLog) from tabular data
#[derive(Debug, Error)]
pub enum EventLogImportError {
    /// IO Error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// A required column (case id, activity or timestamp) is not present
    #[error("missing required column: {0}")]
    MissingColumn(String),
    /// A timestamp value could not be parsed (strict mode only)
    #[error("invalid timestamp at row {row}: '{value}'")]
    InvalidTimestamp {
        /// Row number (1-based, header excluded)
        row: usize,
        /// The unparsable value
        value: String,
    },
    /// A required value is empty (strict mode only)
    #[error("empty value for column '{column}' at row {row}")]
    EmptyValue {
        /// Row number (1-based, header excluded)
        row: usize,
        /// Column name
        column: String,
    },
    /// Error reported by the `DataFrame` backend
    #[error("DataFrame error: {0}")]
    DataFrame(String),
    /// Unsupported file format
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(feature = "dataframes")]
impl From<polars::error::PolarsError> for EventLogImportError {
    fn from(e: polars::error::PolarsError) -> Self {
        Self::DataFrame(e.to_string())
    }
}

/// Names of the three columns an event log table must provide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EventLogColumns {
    /// Case identifier column
    pub case_id: String,
    /// Activity column
    pub activity: String,
    /// Timestamp column
    pub timestamp: String,
}

impl Default for EventLogColumns {
    fn default() -> Self {
        Self {
            case_id: CASE_CONCEPT_NAME.to_string(),
            activity: ACTIVITY_NAME.to_string(),
            timestamp: TIMESTAMP_NAME.to_string(),
        }
    }
}

impl EventLogColumns {
    ///
    /// Find the position of every required column in `header`
    ///
    /// Returns `(case_id, activity, timestamp)` indices or
    /// [`EventLogImportError::MissingColumn`] for the first column that is absent.
    pub fn locate<S: AsRef<str>>(
        &self,
        header: &[S],
    ) -> Result<(usize, usize, usize), EventLogImportError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.as_ref() == name)
                .ok_or_else(|| EventLogImportError::MissingColumn(name.to_string()))
        };
        Ok((
            find(&self.case_id)?,
            find(&self.activity)?,
            find(&self.timestamp)?,
        ))
    }
}

impl Importable for EventLog {
    type Error = EventLogImportError;
    type ImportOptions = CSVImportOptions;

    fn import_from_reader_with_options<R: Read>(
        reader: R,
        format: &str,
        options: Self::ImportOptions,
    ) -> Result<Self, Self::Error> {
        match format.trim_start_matches('.') {
            "csv" => import_event_log_csv(reader, &options),
            "csv.gz" => import_event_log_csv(MultiGzDecoder::new(reader), &options),
            other => Err(EventLogImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
