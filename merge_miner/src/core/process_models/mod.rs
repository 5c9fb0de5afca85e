//! Process Models
//!
//! Representations of process models discovered from (or compared against) event data.
pub mod case_centric;
