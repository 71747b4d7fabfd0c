#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use boneswipe_core::rules::NormalizeOrientation;
use boneswipe_core::traversal::FailureKind;
use boneswipe_core::{
    EffectorErrorPolicy, ExpressionErrorPolicy, Pass, Rule, RuleSet, TreeWalker, WalkConfig,
    WalkError, WalkOutcome,
};
use common::{entries, new_log, record, sample_scene};

#[test]
fn test_expression_error_skipped_by_default() {
    // GIVEN a rule that type-errors on every node, followed by a healthy rule
    let scene = sample_scene();
    let log = new_log();
    let rules = RuleSet::new()
        .with_forward(Rule::when("name > 1", record(&log, "bad")).unwrap())
        .with_forward(Rule::when("true", record(&log, "good")).unwrap());

    // WHEN walking with the default policy
    let report = TreeWalker::default()
        .walk("root", &rules, &scene, &scene)
        .unwrap();

    // THEN the failing predicate counts as false and the walk goes on
    assert_eq!(report.outcome, WalkOutcome::Completed);
    assert!(entries(&log, "bad").is_empty());
    assert_eq!(entries(&log, "good").len(), 5);
    assert_eq!(report.failures.len(), 5);

    let first = &report.failures[0];
    assert_eq!(first.node_id, "root");
    assert_eq!(first.pass, Pass::Forward);
    assert_eq!(first.rule_index, 0);
    assert_eq!(first.kind, FailureKind::Expression);
    assert_eq!(first.label.as_deref(), Some("name > 1"));
}

#[test]
fn test_expression_error_aborts_under_abort_policy() {
    let scene = sample_scene();
    let rules = RuleSet::new()
        .with_backward(Rule::when("is_leaf", record(&new_log(), "ok")).unwrap())
        .with_backward(Rule::when("depth", record(&new_log(), "bad")).unwrap());
    let config = WalkConfig::default().with_expression_policy(ExpressionErrorPolicy::Abort);

    let err = TreeWalker::new(config)
        .unwrap()
        .walk("root", &rules, &scene, &scene)
        .unwrap_err();

    match err {
        WalkError::Expression {
            node_id,
            pass,
            rule_index,
            source,
        } => {
            assert_eq!(node_id, "B");
            assert_eq!(pass, Pass::Backward);
            assert_eq!(rule_index, 1);
            assert_eq!(source.text, "depth");
        }
        other => panic!("expected expression error, got {:?}", other),
    }
}

#[test]
fn test_effector_error_continue_records_and_runs_later_rules() {
    let mut scene = sample_scene();
    scene.set_locked("C", true).unwrap();
    let log = new_log();
    let rules = RuleSet::new()
        .with_forward(Rule::when("true", NormalizeOrientation).unwrap())
        .with_forward(Rule::when("true", record(&log, "after")).unwrap());
    let config = WalkConfig::default().with_effector_policy(EffectorErrorPolicy::Continue);

    let report = TreeWalker::new(config)
        .unwrap()
        .walk("root", &rules, &scene, &scene)
        .unwrap();

    assert_eq!(report.outcome, WalkOutcome::Completed);
    assert_eq!(entries(&log, "after"), vec!["root", "A", "B", "C", "D"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].node_id, "C");
    assert_eq!(report.failures[0].kind, FailureKind::Effector);
    assert_eq!(report.rules_fired, 4 + 5);
}

#[test]
fn test_policies_loaded_from_toml() {
    let config = WalkConfig::from_toml_str(
        r#"
on_expression_error = "abort"
on_effector_error = "continue"
"#,
    )
    .unwrap();
    let scene = sample_scene();
    let rules = RuleSet::new().with_forward(Rule::when("-name == 0", record(&new_log(), "x")).unwrap());

    let err = TreeWalker::new(config)
        .unwrap()
        .walk("root", &rules, &scene, &scene)
        .unwrap_err();

    assert!(matches!(err, WalkError::Expression { .. }));
    assert_eq!(err.node_id(), Some("root"));
}
