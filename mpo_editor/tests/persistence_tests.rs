//! Save, load and export through real files.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use mpo_common::editor::{EditorConfig, ProfileDefaults};
use mpo_editor::persist::{Format, SampledDocument};
use mpo_editor::{
    DocumentEvent, ExportRequest, HueSequence, MotionDocument, MotionNode, PersistError, Session,
};
use tempfile::TempDir;

fn n(t: f64, v: f64) -> MotionNode {
    MotionNode::new(t, v)
}

fn sample_session() -> Session {
    let mut session = Session::default();
    let a = session.add_motor("lift");
    session.add_node(a, n(2000.0, 50.0)).unwrap();
    let b = session.add_motor("tilt");
    session.set_constraints(b, -10.0, 10.0, 0.5).unwrap();
    session.add_node(b, n(500.0, -10.0)).unwrap();
    session.add_node(b, n(500.0, 10.0)).unwrap();
    session.set_document_id("rig_a");
    session
}

fn snapshot(doc: &MotionDocument) -> Vec<(String, Vec<MotionNode>, [f64; 3])> {
    doc.profiles()
        .map(|(_, p)| {
            (
                p.name().to_string(),
                p.nodes(),
                [p.y_min(), p.y_max(), p.max_slope()],
            )
        })
        .collect()
}

#[test]
fn test_round_trip_json_and_toml() {
    let dir = TempDir::new().unwrap();
    let original = sample_session();

    for ext in ["json", "toml"] {
        let path = dir.path().join(format!("doc.{ext}"));
        original.save(&path).unwrap();

        let mut loaded = Session::default();
        loaded.load(&path).unwrap();
        assert_eq!(loaded.document_id(), "rig_a");
        assert_eq!(snapshot(loaded.document()), snapshot(original.document()));
        let colors: Vec<_> = loaded.document().profiles().map(|(_, p)| p.color()).collect();
        let expected: Vec<_> = original.document().profiles().map(|(_, p)| p.color()).collect();
        assert_eq!(colors, expected);
    }
}

#[test]
fn test_load_clears_history_and_selects_first() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.json");
    sample_session().save(&path).unwrap();

    let mut session = Session::default();
    let m = session.add_motor("scratch");
    session.add_node(m, n(10.0, 1.0)).unwrap();
    assert!(session.can_undo());

    session.load(&path).unwrap();
    assert!(!session.can_undo());
    assert_eq!(session.document().active_index(), Some(0));
    assert!(session.document().profile(m).is_none());
}

#[test]
fn test_failed_load_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{ "id": "x", "motors": [
            { "name": "ok", "nodes": [[0, 0]] },
            { "name": "broken", "nodes": [[-5, 0]] }
        ] }"#,
    )
    .unwrap();

    let mut session = sample_session();
    let before = snapshot(session.document());
    let depth = session.history().undo_depth();
    let err = session.load(&path).unwrap_err();
    assert!(matches!(err, PersistError::Malformed(_)));
    assert_eq!(snapshot(session.document()), before);
    assert_eq!(session.history().undo_depth(), depth);
    assert_eq!(session.document_id(), "rig_a");
}

#[test]
fn test_document_cleared_precedes_replacement() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.toml");
    sample_session().save(&path).unwrap();

    let mut doc = MotionDocument::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    doc.subscribe(move |e| sink.borrow_mut().push(*e));

    let mut palette = HueSequence::default();
    doc.load_from_file(&path, &ProfileDefaults::default(), &mut palette)
        .unwrap();
    let events = log.borrow();
    assert_eq!(events.first(), Some(&DocumentEvent::DocumentCleared));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, DocumentEvent::MotorAdded(_)))
            .count(),
        2
    );
}

#[test]
fn test_legacy_keys_and_missing_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.json");
    fs::write(
        &path,
        r#"{ "motors": [ { "name": "old", "nodes": [ {"x": 100, "y": 300}, {"x": 0, "y": 5} ] } ] }"#,
    )
    .unwrap();

    let mut session = Session::default();
    session.load(&path).unwrap();
    assert_eq!(session.document_id(), "default_id");
    let id = session.document().profile_by_name("old").unwrap();
    let profile = session.document().profile(id).unwrap();
    // Sorted on load; out-of-range values survive until repaired.
    assert_eq!(profile.nodes(), [n(0.0, 5.0), n(100.0, 300.0)]);
    assert_eq!(profile.range_violations(), [1]);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.yaml");
    let err = sample_session().save(&path).unwrap_err();
    assert!(matches!(err, PersistError::UnsupportedFormat(_)));
    assert!(!path.exists());
}

#[test]
fn test_export_samples_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("samples.json");
    let session = sample_session();
    let request = ExportRequest {
        id: "out".into(),
        sample_rate_hz: 2.0,
        end_time_ms: 1200.0,
    };
    session.export_with(&path, &request).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let sampled: SampledDocument = Format::Json.decode(&text).unwrap();
    assert_eq!(sampled.id, "out");
    assert_eq!(sampled.motors.len(), 2);
    let times: Vec<f64> = sampled.motors[0].samples.iter().map(|s| s[0]).collect();
    assert_eq!(times, [0.0, 500.0, 1000.0, 1200.0]);
    assert_eq!(sampled.motors[0].samples[2][1], 25.0);
}

#[test]
fn test_export_rejects_bad_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("samples.toml");
    let request = ExportRequest {
        sample_rate_hz: 0.0,
        ..ExportRequest::default()
    };
    let err = sample_session().export_with(&path, &request).unwrap_err();
    assert!(matches!(err, PersistError::Export { .. }));
    assert!(!path.exists());
}

#[test]
fn test_default_export_uses_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("samples.toml");
    let mut config = EditorConfig::default();
    config.export.sample_rate_hz = 1.0;
    let mut session = Session::new(config);
    let m = session.add_motor("m");
    session.add_node(m, n(3000.0, 30.0)).unwrap();
    session.export(&path).unwrap();

    let sampled: SampledDocument = Format::Toml
        .decode(&fs::read_to_string(&path).unwrap())
        .unwrap();
    assert_eq!(sampled.end_time_ms, 3000.0);
    assert_eq!(sampled.motors[0].samples.len(), 4);
}
