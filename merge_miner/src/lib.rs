#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![allow(clippy::needless_doctest_main)]

#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod conformance;
pub mod core;
pub mod discovery;


#[doc(inline)]
pub use crate::core::{DirectlyFollowsGraph, EventLog};

#[doc(inline)]
pub use crate::core::io::{Exportable, Importable};

#[doc(inline)]
pub use crate::core::event_data::case_centric::event_log_csv::{
    import_event_log_csv, import_event_log_csv_path, CSVImportOptions,
};

#[cfg(feature = "dataframes")]
#[doc(inline)]
pub use crate::core::event_data::case_centric::dataframe::{
    convert_dataframe_to_event_log, convert_event_log_to_dataframe,
};

#[doc(inline)]
pub use crate::discovery::case_centric::bounded_dfg::{
    discover_bounded_dfg, DiscoveryConfig, DiscoveryError,
};

#[doc(inline)]
pub use crate::discovery::case_centric::comparison::{discover_comparison_dfg, ComparisonConfig};

#[doc(inline)]
pub use crate::discovery::case_centric::dfg::discover_dfg;
