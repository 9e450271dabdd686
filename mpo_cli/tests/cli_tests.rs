//! Subcommand operations against documents on disk.

use std::fs;
use std::path::PathBuf;

use mpo_cli::{CliError, DocumentSummary, export_request, open, repair};
use mpo_common::editor::EditorConfig;
use mpo_editor::persist::SampledDocument;
use mpo_editor::{ExportError, PersistError};
use tempfile::TempDir;

const STEEP: &str = r#"{
  "id": "rig_b",
  "motors": [
    { "name": "lift", "y_min": 0.0, "y_max": 100.0, "max_slope": 1.0,
      "nodes": [[0.0, 0.0], [10.0, 50.0], [20.0, 55.0]] },
    { "name": "tilt", "y_min": -10.0, "y_max": 10.0, "max_slope": 5.0,
      "nodes": [[0.0, 0.0], [100.0, 20.0]] }
  ]
}"#;

fn write_doc(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_info_reports_violations() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir, "show.json", STEEP);
    let session = open(&EditorConfig::default(), &input).unwrap();

    let summary = DocumentSummary::new(session.document(), session.document_id());
    assert_eq!(summary.id, "rig_b");
    assert_eq!(summary.active.as_deref(), Some("lift"));
    assert_eq!(summary.motors[0].slope_violations, [0]);
    assert_eq!(summary.motors[1].range_violations, [1]);
    assert!(summary.has_violations());

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["motors"][1]["name"], "tilt");
}

#[test]
fn test_repair_all_then_save() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir, "show.json", STEEP);
    let mut session = open(&EditorConfig::default(), &input).unwrap();

    assert_eq!(repair(&mut session, None).unwrap(), 2);
    let summary = DocumentSummary::new(session.document(), session.document_id());
    assert!(!summary.has_violations());

    let output = dir.path().join("fixed.toml");
    session.save(&output).unwrap();
    let reopened = open(&EditorConfig::default(), &output).unwrap();
    let lift = reopened.document().profile_by_name("lift").unwrap();
    let values: Vec<f64> = reopened
        .document()
        .profile(lift)
        .unwrap()
        .iter()
        .map(|n| n.value)
        .collect();
    assert_eq!(values, [0.0, 10.0, 20.0]);
}

#[test]
fn test_repair_single_motor() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir, "show.json", STEEP);
    let mut session = open(&EditorConfig::default(), &input).unwrap();

    assert_eq!(repair(&mut session, Some("tilt")).unwrap(), 1);
    let summary = DocumentSummary::new(session.document(), session.document_id());
    assert!(summary.motors[1].range_violations.is_empty());
    assert_eq!(summary.motors[0].slope_violations, [0]);

    assert!(matches!(
        repair(&mut session, Some("pan")),
        Err(CliError::UnknownMotor(name)) if name == "pan"
    ));
}

#[test]
fn test_export_with_overrides() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir, "show.json", STEEP);
    let session = open(&EditorConfig::default(), &input).unwrap();

    let request = export_request(&session, Some(100.0), Some(50.0), None);
    assert_eq!(request.id, "rig_b");
    let output = dir.path().join("samples.json");
    session.export_with(&output, &request).unwrap();

    let exported: SampledDocument =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(exported.motors.len(), 2);
    let times: Vec<f64> = exported.motors[0].samples.iter().map(|s| s[0]).collect();
    assert_eq!(times, [0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    assert_eq!(exported.motors[0].samples[1][1], 50.0);
}

#[test]
fn test_export_rejects_extreme_rate() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir, "show.json", STEEP);
    let session = open(&EditorConfig::default(), &input).unwrap();

    let request = export_request(&session, Some(1e300), Some(1.0), None);
    let output = dir.path().join("samples.json");
    assert!(matches!(
        session.export_with(&output, &request),
        Err(PersistError::Export {
            source: ExportError::TooManySamples { .. }
        })
    ));
    assert!(!output.exists());
}

#[test]
fn test_open_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(matches!(
        open(&EditorConfig::default(), &missing),
        Err(CliError::Persist(_))
    ));
}
