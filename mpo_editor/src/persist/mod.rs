//! Saving and loading documents.
//!
//! Reads are all-or-nothing: [`read_document`] either returns a fully
//! decoded record or an error, and nothing in a document changes until the
//! record has been turned into profiles.

mod format;
mod schema;

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

pub use format::Format;
pub use schema::{DocumentRecord, MotorRecord, NodeRecord, SampledDocument, SampledMotor};

use crate::error::{PersistError, PersistResult};

/// Read and decode a document file.
pub fn read_document(path: &Path) -> PersistResult<DocumentRecord> {
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| {
        warn!("Failed to read {}: {source}", path.display());
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    format.decode(&text)
}

/// Encode and write a document file.
pub fn write_document(path: &Path, record: &DocumentRecord) -> PersistResult<()> {
    write_encoded(path, record)
}

/// Encode `value` in the format named by `path` and write it.
pub(crate) fn write_encoded<T: Serialize>(path: &Path, value: &T) -> PersistResult<()> {
    let text = Format::from_path(path)?.encode(value)?;
    fs::write(path, text).map_err(|source| {
        warn!("Failed to write {}: {source}", path.display());
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MotionNode;

    #[test]
    fn node_accepts_pair_current_and_legacy_keys() {
        let json = r#"{
            "id": "doc",
            "motors": [
                { "name": "a", "nodes": [[0, 1], {"time": 10, "value": 2}, {"x": 20, "y": 3}] }
            ]
        }"#;
        let record: DocumentRecord = Format::Json.decode(json).unwrap();
        let nodes: Vec<MotionNode> = record.motors[0].nodes.iter().map(NodeRecord::node).collect();
        assert_eq!(
            nodes,
            [
                MotionNode::new(0.0, 1.0),
                MotionNode::new(10.0, 2.0),
                MotionNode::new(20.0, 3.0)
            ]
        );
    }

    #[test]
    fn missing_id_uses_default() {
        let record: DocumentRecord = Format::Toml.decode("").unwrap();
        assert_eq!(record.id, "default_id");
        assert!(record.motors.is_empty());
    }

    #[test]
    fn toml_document_decodes() {
        let text = r##"
            id = "rig"

            [[motors]]
            name = "lift"
            color = "#ff0000"
            y_max = 50.0
            nodes = [[0.0, 0.0], [2000.0, 50.0]]
        "##;
        let record: DocumentRecord = Format::Toml.decode(text).unwrap();
        assert_eq!(record.id, "rig");
        assert_eq!(record.motors[0].y_max, Some(50.0));
        assert_eq!(record.motors[0].y_min, None);
        assert_eq!(record.motors[0].nodes.len(), 2);
    }

    #[test]
    fn bad_pair_is_an_error() {
        let json = r#"{ "motors": [ { "name": "a", "nodes": [[1, 2, 3]] } ] }"#;
        assert!(matches!(
            Format::Json.decode::<DocumentRecord>(json),
            Err(PersistError::Json { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_document(Path::new("/nonexistent/dir/doc.json")).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }
}
