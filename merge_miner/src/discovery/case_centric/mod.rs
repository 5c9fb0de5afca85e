//! Discovery on case-centric event data
//!
//! - [`dfg`]: the complete [`DirectlyFollowsGraph`](crate::core::DirectlyFollowsGraph) of an event log
//! - [`bounded_dfg`]: a size-bounded, connected graph of the most frequent relations
//! - [`comparison`]: one graph summarizing what several event logs share
pub mod bounded_dfg;
pub mod comparison;
pub mod dfg;
