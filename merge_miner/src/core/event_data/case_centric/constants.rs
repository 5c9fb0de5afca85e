//! Column names of the canonical event log table
//!
//! The names follow the `PM4Py`/XES conventions so that logs exported by other
//! process mining tools can be read without renaming columns.

/// Column holding the case (trace) identifier
pub const CASE_CONCEPT_NAME: &str = "case:concept:name";
/// Column holding the activity label of an event
pub const ACTIVITY_NAME: &str = "concept:name";
/// Column holding the (completion) timestamp of an event
pub const TIMESTAMP_NAME: &str = "time:timestamp";
