//! Rules and rule sets
//!
//! A rule pairs a predicate (a compiled `Expression` or a native closure)
//! with an action. Rules are evaluated by the walker; they read the
//! `TraversalContext` and act only through an `ActionEffector`.

pub mod actions;
pub mod rule;
pub mod rule_set;

pub use actions::{action_fn, Action, NormalizeOrientation, SpawnMarker};
pub use rule::{predicate_fn, Predicate, Rule, RuleError, RuleOutcome};
pub use rule_set::RuleSet;
