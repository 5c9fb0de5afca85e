//! IO implementations for [`DirectlyFollowsGraph`]

use std::io::{Read, Write};

use thiserror::Error;

use crate::core::io::{Exportable, Importable};
use crate::core::process_models::case_centric::dfg::DirectlyFollowsGraph;

/// Error type for [`DirectlyFollowsGraph`] IO operations
#[derive(Debug, Error)]
pub enum DfgIOError {
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization error
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unsupported Format
    #[error("Unsupported Format: {0}")]
    UnsupportedFormat(String),
}

impl Importable for DirectlyFollowsGraph {
    type Error = DfgIOError;
    type ImportOptions = ();

    fn import_from_reader_with_options<R: Read>(
        reader: R,
        format: &str,
        _: Self::ImportOptions,
    ) -> Result<Self, Self::Error> {
        if format == "json" || format.ends_with(".json") {
            Ok(serde_json::from_reader(reader)?)
        } else {
            Err(DfgIOError::UnsupportedFormat(format.to_string()))
        }
    }
}

impl Exportable for DirectlyFollowsGraph {
    type Error = DfgIOError;

    fn export_to_writer<W: Write>(&self, writer: W, format: &str) -> Result<(), Self::Error> {
        if format == "json" || format.ends_with(".json") {
            Ok(serde_json::to_writer(writer, self)?)
        } else {
            Err(DfgIOError::UnsupportedFormat(format.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> DirectlyFollowsGraph {
        let mut dfg = DirectlyFollowsGraph::new();
        dfg.add_activity("a".into(), 2);
        dfg.add_activity("b".into(), 1);
        dfg.add_df_relation("a".into(), "b".into(), 1);
        dfg.add_start_activity("a".into());
        dfg.add_end_activity("b".into());
        dfg
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dfg.json");
        let dfg = graph();
        dfg.export_to_path(&path).unwrap();
        assert_eq!(DirectlyFollowsGraph::import_from_path(&path).unwrap(), dfg);
    }

    #[test]
    fn unsupported_format() {
        assert!(matches!(
            graph().export_to_vec("svg"),
            Err(DfgIOError::UnsupportedFormat(f)) if f == "svg"
        ));
    }
}
