//! Analysis of case-centric process artifacts
pub mod backbone;
pub mod dfg_style;
