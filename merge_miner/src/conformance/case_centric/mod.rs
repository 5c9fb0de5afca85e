//! Conformance checking of case-centric process models
pub mod dfg_evaluation;
