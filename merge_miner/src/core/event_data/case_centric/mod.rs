//! Case-centric Event Data
pub mod constants;
#[cfg(feature = "dataframes")]
pub mod dataframe;
pub mod event_log_csv;
#[doc(hidden)]
pub(crate) mod event_log_struct;
pub mod io;
pub mod macros;
#[doc(inline)]
pub use event_log_struct::*;
