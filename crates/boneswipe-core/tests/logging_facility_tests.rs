#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use boneswipe_core::errors::{SwErrorKind, WalkError};
use boneswipe_core::logging_facility::test_capture::init_test_capture;
use boneswipe_core::schema::{EVENT_END, EVENT_END_ERROR, EVENT_RULE_FAILED, EVENT_START};
use boneswipe_core::{log_op_end, log_op_error, log_op_start};
use boneswipe_core::{Rule, RuleSet, TreeWalker, WalkConfig};
use common::{build_scene, new_log, record};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, root_id = "hips");

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field("root_id"), Some("hips"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_kind_and_node() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = WalkError::DepthLimitExceeded {
        node_id: "deep_joint".to_string(),
        max_depth: 4,
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(event.node_id.as_deref(), Some("deep_joint"));
    assert_eq!(
        event.field("err_code"),
        Some(SwErrorKind::DepthLimitExceeded.code())
    );
}

#[test]
fn test_walk_emits_start_and_end() {
    let capture = init_test_capture();
    let scene = build_scene(vec![("log_root_unique_4", vec!["log_leaf_unique_4"])]);

    TreeWalker::default()
        .walk("log_root_unique_4", &RuleSet::new(), &scene, &scene)
        .unwrap();

    let events = capture.events_for_op("walk");
    let start = events
        .iter()
        .find(|e| {
            e.event.as_deref() == Some(EVENT_START)
                && e.field("root_id") == Some("log_root_unique_4")
        })
        .expect("walk start event");
    let run_id = start.field("run_id").expect("run_id on start");

    let end = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END) && e.field("run_id") == Some(run_id))
        .expect("walk end event with the same run_id");
    assert_eq!(end.field("nodes_visited"), Some("2"));
}

#[test]
fn test_skipped_predicate_failure_is_logged_with_rule_index() {
    let capture = init_test_capture();
    let scene = build_scene(vec![("log_root_unique_5", vec![])]);
    let rules = RuleSet::new()
        .with_forward(Rule::when("true", record(&new_log(), "ok")).unwrap())
        .with_forward(Rule::when("name < 3", record(&new_log(), "bad")).unwrap());

    let report = TreeWalker::new(WalkConfig::default())
        .unwrap()
        .walk("log_root_unique_5", &rules, &scene, &scene)
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    capture.assert_rule_failure("log_root_unique_5", 1);
    let failures = capture.count_events(|e| {
        e.event.as_deref() == Some(EVENT_RULE_FAILED)
            && e.node_id.as_deref() == Some("log_root_unique_5")
    });
    assert_eq!(failures, 1);
}
