//! Directly-follows graph
pub(crate) mod dfg_struct;
pub mod io;
pub use dfg_struct::*;
