//! Event Data
//!
//! Fundamental structs and adjacient utilities for process data
pub mod case_centric;
pub mod timestamp_utils;

#[doc(inline)]
pub use case_centric::EventLog;
