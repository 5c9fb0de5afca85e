//! Conversion of [`EventLog`]s from/to polars `DataFrame`s
//!
//! 🔐 Requires the `dataframes` feature to be enabled.
use chrono::DateTime;
use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::event_data::{
    case_centric::{
        constants::{ACTIVITY_NAME, CASE_CONCEPT_NAME, TIMESTAMP_NAME},
        io::{EventLogColumns, EventLogImportError},
        Case, Event, EventLog,
    },
    timestamp_utils::parse_timestamp,
};

const NANOS_COLUMN: &str = "__timestamp_ns";

///
/// Convert an [`EventLog`] to a polars [`DataFrame`]
///
/// The frame has one row per event and the canonical columns [`CASE_CONCEPT_NAME`],
/// [`ACTIVITY_NAME`] and [`TIMESTAMP_NAME`] (nanosecond `Datetime`, UTC).
///
pub fn convert_event_log_to_dataframe(log: &EventLog) -> Result<DataFrame, PolarsError> {
    let n = log.num_events();
    let mut case_ids: Vec<&str> = Vec::with_capacity(n);
    let mut activities: Vec<&str> = Vec::with_capacity(n);
    let mut nanos: Vec<i64> = Vec::with_capacity(n);
    for case in &log.cases {
        for event in &case.events {
            let ns = event.timestamp.timestamp_nanos_opt().ok_or_else(|| {
                PolarsError::ComputeError(
                    format!("timestamp {} out of nanosecond range", event.timestamp).into(),
                )
            })?;
            case_ids.push(&case.id);
            activities.push(&event.activity);
            nanos.push(ns);
        }
    }
    let timestamps = Series::new(TIMESTAMP_NAME.into(), nanos)
        .cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))?;
    DataFrame::new(vec![
        Column::new(CASE_CONCEPT_NAME.into(), case_ids),
        Column::new(ACTIVITY_NAME.into(), activities),
        timestamps.into_column(),
    ])
}

///
/// Convert a polars [`DataFrame`] to an [`EventLog`]
///
///  - The columns named in `columns` must exist; otherwise
///    [`EventLogImportError::MissingColumn`] is returned before any row is processed.
///  - Case ids and activities are cast to strings. Timestamps may be `Datetime`/`Date`
///    columns or strings (parsed with the same formats as the CSV import).
///  - Rows with a null case id, activity or timestamp are dropped.
///
/// Sorting by (case, timestamp) and grouping by case are done by polars.
///
pub fn convert_dataframe_to_event_log(
    df: &DataFrame,
    columns: &EventLogColumns,
) -> Result<EventLog, EventLogImportError> {
    let header: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|c| c.to_string())
        .collect();
    columns.locate(&header)?;

    let case_col = df
        .column(&columns.case_id)?
        .cast(&DataType::String)?
        .with_name(CASE_CONCEPT_NAME.into());
    let act_col = df
        .column(&columns.activity)?
        .cast(&DataType::String)?
        .with_name(ACTIVITY_NAME.into());
    let ts_col = timestamp_nanos_column(df.column(&columns.timestamp)?)?;

    let normalized = DataFrame::new(vec![case_col, act_col, ts_col])?;
    let before = normalized.height();
    let normalized = normalized.drop_nulls::<String>(None)?;
    if normalized.height() < before {
        warn!(
            dropped = before - normalized.height(),
            "Dropped event rows with missing case id, activity or timestamp"
        );
    }
    let sorted = normalized.sort(
        [CASE_CONCEPT_NAME, NANOS_COLUMN],
        SortMultipleOptions::default().with_maintain_order(true),
    )?;
    let groups = sorted.partition_by_stable([CASE_CONCEPT_NAME], true)?;

    let cases = groups
        .par_iter()
        .map(case_from_group)
        .collect::<Result<Vec<Case>, PolarsError>>()?;
    let log = EventLog::from_cases(cases);
    debug!(
        cases = log.num_cases(),
        events = log.num_events(),
        "Converted DataFrame to event log"
    );
    Ok(log)
}

/// Normalize a timestamp column to nanoseconds since the epoch (`Int64`)
fn timestamp_nanos_column(col: &Column) -> Result<Column, EventLogImportError> {
    let nanos = if col.dtype() == &DataType::String {
        let parsed: Vec<Option<i64>> = col
            .str()?
            .into_iter()
            .map(|v| {
                v.and_then(|s| parse_timestamp(s, None))
                    .and_then(|dt| dt.timestamp_nanos_opt())
            })
            .collect();
        Column::new(NANOS_COLUMN.into(), parsed)
    } else {
        col.cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))?
            .cast(&DataType::Int64)?
            .with_name(NANOS_COLUMN.into())
    };
    Ok(nanos)
}

fn case_from_group(group: &DataFrame) -> Result<Case, PolarsError> {
    let ids = group.column(CASE_CONCEPT_NAME)?.str()?;
    let acts = group.column(ACTIVITY_NAME)?.str()?;
    let nanos = group.column(NANOS_COLUMN)?.i64()?;
    let id = ids.get(0).unwrap_or_default().to_string();
    let events = acts
        .into_iter()
        .zip(nanos)
        .filter_map(|(act, ns)| {
            Some(Event::new(
                act?,
                DateTime::from_timestamp_nanos(ns?).fixed_offset(),
            ))
        })
        .collect();
    Ok(Case::new(id, events))
}
