use std::rc::Rc;

use thiserror::Error;

use super::actions::Action;
use crate::errors::{EffectorError, ExpressionError};
use crate::expr::Expression;
use crate::host::ActionEffector;
use crate::traversal::TraversalContext;

/// Condition half of a rule
pub trait Predicate {
    /// # Errors
    ///
    /// Returns `ExpressionError` if the condition cannot be decided.
    fn test(&self, ctx: &TraversalContext<'_>) -> Result<bool, ExpressionError>;
}

impl Predicate for Expression {
    fn test(&self, ctx: &TraversalContext<'_>) -> Result<bool, ExpressionError> {
        self.evaluate(ctx)
    }
}

/// Predicate backed by a native closure
pub struct PredicateFn<F>(F);

/// Wrap an infallible closure as a predicate
pub fn predicate_fn<F>(f: F) -> PredicateFn<F>
where
    F: Fn(&TraversalContext<'_>) -> bool,
{
    PredicateFn(f)
}

impl<F> Predicate for PredicateFn<F>
where
    F: Fn(&TraversalContext<'_>) -> bool,
{
    fn test(&self, ctx: &TraversalContext<'_>) -> Result<bool, ExpressionError> {
        Ok((self.0)(ctx))
    }
}

/// Why running a rule failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("predicate failed: {0}")]
    Predicate(#[source] ExpressionError),

    #[error("action failed: {0}")]
    Action(#[source] EffectorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Predicate held and the action ran
    Fired,
    /// Predicate was false; the action did not run
    Skipped,
}

/// A predicate paired with an action
///
/// Rules are cheap to clone; the predicate and action are shared.
#[derive(Clone)]
pub struct Rule {
    label: Option<String>,
    predicate: Rc<dyn Predicate>,
    action: Rc<dyn Action>,
}

impl Rule {
    pub fn new(predicate: impl Predicate + 'static, action: impl Action + 'static) -> Self {
        Self {
            label: None,
            predicate: Rc::new(predicate),
            action: Rc::new(action),
        }
    }

    /// Build a rule from predicate text
    ///
    /// The expression is compiled here, so a bad predicate is reported
    /// before any walk starts. The label defaults to the text.
    ///
    /// # Errors
    ///
    /// Returns `ExpressionError` if the text does not compile.
    pub fn when(text: &str, action: impl Action + 'static) -> Result<Self, ExpressionError> {
        let expression = Expression::compile(text)?;
        Ok(Self::new(expression, action).with_label(text))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Evaluate the predicate and, if it holds, run the action
    ///
    /// # Errors
    ///
    /// Returns `RuleError::Predicate` if the predicate fails (the action is
    /// not run) and `RuleError::Action` if the action fails.
    pub fn run(
        &self,
        ctx: &TraversalContext<'_>,
        effector: &dyn ActionEffector,
    ) -> Result<RuleOutcome, RuleError> {
        if !self.predicate.test(ctx).map_err(RuleError::Predicate)? {
            return Ok(RuleOutcome::Skipped);
        }
        self.action
            .execute(ctx, effector)
            .map_err(RuleError::Action)?;
        Ok(RuleOutcome::Fired)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("label", &self.label).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoopEffector;
    use crate::model::{Node, NodeAttributes};
    use crate::rules::actions::action_fn;
    use crate::traversal::Pass;
    use std::cell::Cell;

    fn leaf(id: &str) -> Node {
        Node::capture(id, NodeAttributes::default(), 1, 1)
    }

    #[test]
    fn test_action_runs_only_when_predicate_holds() {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let rule = Rule::when("endswith(\"_end\")", action_fn(move |_, _| {
            counter.set(counter.get() + 1);
            Ok(())
        }))
        .unwrap();

        let hit = leaf("hand_end");
        let miss = leaf("hand");
        let path = [hit.clone()];
        let ctx = TraversalContext::new(&path[0], &path, Pass::Forward);
        assert_eq!(rule.run(&ctx, &NoopEffector).unwrap(), RuleOutcome::Fired);

        let path = [miss];
        let ctx = TraversalContext::new(&path[0], &path, Pass::Forward);
        assert_eq!(rule.run(&ctx, &NoopEffector).unwrap(), RuleOutcome::Skipped);

        assert_eq!(fired.get(), 1);
        assert_eq!(rule.label(), Some("endswith(\"_end\")"));
    }

    #[test]
    fn test_predicate_error_prevents_action() {
        let rule = Rule::when("name > 1", action_fn(|_, _| panic!("must not run"))).unwrap();
        let path = [leaf("a")];
        let ctx = TraversalContext::new(&path[0], &path, Pass::Forward);

        assert!(matches!(
            rule.run(&ctx, &NoopEffector),
            Err(RuleError::Predicate(_))
        ));
    }

    #[test]
    fn test_action_error_is_reported() {
        let rule = Rule::new(
            predicate_fn(|_| true),
            action_fn(|ctx, _| {
                Err(EffectorError::Rejected {
                    node_id: ctx.name().to_string(),
                    reason: "locked".to_string(),
                })
            }),
        );
        let path = [leaf("a")];
        let ctx = TraversalContext::new(&path[0], &path, Pass::Forward);

        assert!(matches!(
            rule.run(&ctx, &NoopEffector),
            Err(RuleError::Action(EffectorError::Rejected { .. }))
        ));
    }

    #[test]
    fn test_bad_text_fails_at_construction() {
        assert!(Rule::when("endswith(", action_fn(|_, _| Ok(()))).is_err());
    }
}
