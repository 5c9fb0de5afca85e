//! CSV Import for [`EventLog`]s
//!
//! Reads a flat event table (one row per event) and groups it into cases. Only the case id,
//! activity and timestamp columns are used; all other columns are ignored.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use chrono::{DateTime, FixedOffset};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    event_data::{
        case_centric::{
            io::{EventLogColumns, EventLogImportError},
            EventLog,
        },
        timestamp_utils::parse_timestamp,
    },
    io::Importable,
};

/// Options for CSV [`EventLog`] import
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CSVImportOptions {
    /// Names of the case id, activity and timestamp columns
    pub columns: EventLogColumns,
    /// Optional date format tried first when parsing timestamps
    pub date_format: Option<String>,
    /// Field delimiter
    pub delimiter: u8,
    /// Strict mode: fail on rows with empty values or unparsable timestamps instead of
    /// skipping them
    pub strict: bool,
}

impl Default for CSVImportOptions {
    fn default() -> Self {
        Self {
            columns: EventLogColumns::default(),
            date_format: None,
            delimiter: b',',
            strict: false,
        }
    }
}

///
/// Import an [`EventLog`] from a CSV reader
///
/// The header row must contain the three columns named in [`CSVImportOptions::columns`];
/// a missing column is reported as [`EventLogImportError::MissingColumn`] before any row
/// is read.
///
pub fn import_event_log_csv<R: Read>(
    reader: R,
    options: &CSVImportOptions,
) -> Result<EventLog, EventLogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let header: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();
    let (case_idx, act_idx, time_idx) = options.columns.locate(&header)?;

    let mut rows: Vec<(String, String, DateTime<FixedOffset>)> = Vec::new();
    let mut skipped = 0_usize;
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        match parse_row(&record, row, (case_idx, act_idx, time_idx), options) {
            Ok(parsed) => rows.push(parsed),
            Err(e) if options.strict => return Err(e),
            Err(e) => {
                warn!("Skipping CSV row: {e}");
                skipped += 1;
            }
        }
    }

    let log = EventLog::from_rows(rows);
    debug!(
        cases = log.num_cases(),
        events = log.num_events(),
        skipped,
        "Imported event log from CSV"
    );
    Ok(log)
}

///
/// Import an [`EventLog`] from a CSV file
///
/// Files ending in `.gz` are decompressed on the fly.
///
pub fn import_event_log_csv_path<P: AsRef<Path>>(
    path: P,
    options: &CSVImportOptions,
) -> Result<EventLog, EventLogImportError> {
    let path = path.as_ref();
    let is_gz = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    let format = if is_gz { "csv.gz" } else { "csv" };
    let reader = BufReader::new(File::open(path)?);
    EventLog::import_from_reader_with_options(reader, format, options.clone())
}

fn parse_row(
    record: &csv::StringRecord,
    row: usize,
    (case_idx, act_idx, time_idx): (usize, usize, usize),
    options: &CSVImportOptions,
) -> Result<(String, String, DateTime<FixedOffset>), EventLogImportError> {
    let value = |idx: usize, column: &str| match record.get(idx) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(EventLogImportError::EmptyValue {
            row,
            column: column.to_string(),
        }),
    };
    let case_id = value(case_idx, &options.columns.case_id)?;
    let activity = value(act_idx, &options.columns.activity)?;
    let time = value(time_idx, &options.columns.timestamp)?;
    let timestamp = parse_timestamp(time, options.date_format.as_deref()).ok_or_else(|| {
        EventLogImportError::InvalidTimestamp {
            row,
            value: time.to_string(),
        }
    })?;
    Ok((case_id.to_string(), activity.to_string(), timestamp))
}
