#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use boneswipe_core::errors::ExpressionCause;
use boneswipe_core::{Expression, Rule, RuleSet, TreeWalker};
use common::{build_scene, entries, new_log, record};

/// root -> arm -> {elbow -> hand_end -> tip, shoulder_end}
fn limb() -> boneswipe_core::SceneGraph {
    build_scene(vec![
        ("root", vec!["arm"]),
        ("arm", vec!["elbow", "shoulder_end"]),
        ("elbow", vec!["hand_end"]),
        ("hand_end", vec!["tip"]),
    ])
}

fn fired_on(text: &str) -> Vec<String> {
    let scene = limb();
    let log = new_log();
    let rules = RuleSet::new().with_forward(Rule::when(text, record(&log, "hit")).unwrap());
    TreeWalker::default()
        .walk("root", &rules, &scene, &scene)
        .unwrap();
    entries(&log, "hit")
}

#[test]
fn test_has_past_matches_ancestors_and_self() {
    assert_eq!(
        fired_on("has_past(name == \"elbow\")"),
        vec!["elbow", "hand_end", "tip"]
    );
}

#[test]
fn test_is_between_stops_at_nearest_end() {
    // below arm, until an _end joint is crossed
    assert_eq!(
        fired_on("is_between(name == \"arm\", endswith(\"_end\"))"),
        vec!["arm", "elbow"]
    );
}

#[test]
fn test_is_between_nested_helper_sees_its_own_subject() {
    // the start predicate is asked about each scanned ancestor, not the walk node
    assert_eq!(
        fired_on("is_between(has_past(name == \"elbow\"), name == \"root\")"),
        vec!["elbow", "hand_end", "tip"]
    );
}

#[test]
fn test_count_past_and_depth() {
    assert_eq!(
        fired_on("count_past(endswith(\"_end\")) == 1 and is_leaf"),
        vec!["tip", "shoulder_end"]
    );
    assert_eq!(fired_on("depth == 3"), vec!["elbow", "shoulder_end"]);
}

#[test]
fn test_compile_errors_are_categorised() {
    let cases: Vec<(&str, fn(&ExpressionCause) -> bool)> = vec![
        ("name ==", |c| matches!(c, ExpressionCause::Syntax { .. })),
        ("hips()", |c| matches!(c, ExpressionCause::UnknownName { .. })),
        ("bone_name == \"a\"", |c| matches!(c, ExpressionCause::UnknownName { .. })),
        ("has_past()", |c| matches!(c, ExpressionCause::Arity { .. })),
        ("matches(\"[\")", |c| matches!(c, ExpressionCause::InvalidRegex { .. })),
    ];
    for (text, check) in cases {
        let err = Expression::compile(text).unwrap_err();
        assert!(check(&err.cause), "{}: {:?}", text, err.cause);
        assert!(err.cause.is_compile_time());
    }
}

#[test]
fn test_no_host_escape() {
    for text in ["exec(\"rm\")", "import os", "name.__class__", "open(\"/etc/passwd\")"] {
        assert!(Expression::compile(text).is_err(), "{} should not compile", text);
    }
}
