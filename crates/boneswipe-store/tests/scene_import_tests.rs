#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;

use boneswipe_core::errors::SwErrorKind;
use boneswipe_core::rules::SpawnMarker;
use boneswipe_core::{Rule, RuleSet, Selection, TreeWalker, Vec3};
use boneswipe_store::scene::{compute_scene_digest, parse_scene_file};
use boneswipe_store::{import_scene, import_scene_str};
use tempfile::NamedTempFile;

const RIG: &str = r#"
schema_version: 0
scene:
  name: rig
nodes:
  - id: hips
    translate: [0, 100, 0]
    children: [spine]
  - id: spine
    translate: [0, 10, 0]
    rotate: [0, 0, 90]
    children: [neck_end]
  - id: neck_end
    translate: [0, 5, 0]
selection: [hips]
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_import_from_file_and_walk_selection() {
    // GIVEN a scene file on disk
    let file = write_temp(RIG);

    // WHEN importing it and walking the selection
    let imported = import_scene(file.path()).unwrap();
    let scene = &imported.graph;
    assert_eq!(scene.first_selected(), Some("hips".to_string()));

    let rules =
        RuleSet::new().with_forward(Rule::when("endswith(\"_end\")", SpawnMarker).unwrap());
    let report = TreeWalker::default()
        .walk_selection(scene, &rules, scene, scene)
        .unwrap();

    // THEN the end joint got a marker at its world position
    assert_eq!(report.nodes_visited, 3);
    let markers = scene.markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].node_id, "neck_end");
    // spine's Z rotation turns the +Y offset of neck_end into -X
    assert!(markers[0]
        .translate
        .approx_eq(Vec3::new(-5.0, 110.0, 0.0), 1e-9));
}

#[test]
fn test_digest_matches_parsed_file() {
    let file = write_temp(RIG);
    let imported = import_scene(file.path()).unwrap();
    let parsed = parse_scene_file(file.path()).unwrap();
    assert_eq!(imported.digest, compute_scene_digest(&parsed).unwrap());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = import_scene(&dir.path().join("absent.yaml")).unwrap_err();
    assert_eq!(err.kind(), SwErrorKind::Io);
}

#[test]
fn test_invalid_scene_is_invalid_input() {
    let err = import_scene_str("schema_version: 0\nscene: {name: x}\nnodes: [{id: a, children: [a]}]\n")
        .unwrap_err();
    assert_eq!(err.kind(), SwErrorKind::InvalidInput);
    assert_eq!(err.op(), Some("scene_parse"));
}

#[test]
fn test_locked_flag_survives_import() {
    let yaml = r#"
schema_version: 0
scene:
  name: locked
nodes:
  - id: root
    rotate: [0, 30, 0]
    locked: true
"#;
    let imported = import_scene_str(yaml).unwrap();
    let rules = RuleSet::new().with_forward(
        Rule::when("true", boneswipe_core::rules::NormalizeOrientation).unwrap(),
    );

    let err = TreeWalker::default()
        .walk("root", &rules, &imported.graph, &imported.graph)
        .unwrap_err();

    assert_eq!(err.node_id(), Some("root"));
    assert_eq!(
        imported.graph.local_transform("root").unwrap().rotate,
        Vec3::new(0.0, 30.0, 0.0)
    );
}
