//! Failure policies for rule evaluation
//!
//! A walk runs user-supplied predicates and host effectors at every node.
//! These policies decide whether a failing rule stops the whole walk or is
//! recorded and skipped. Both are plain configuration values (see
//! `WalkConfig`) so hosts can pick them per run.

use serde::{Deserialize, Serialize};

/// What to do when a predicate fails to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionErrorPolicy {
    /// Treat the predicate as false, log and record the failure, keep walking
    #[default]
    Skip,
    /// Stop the walk and return `WalkError::Expression`
    Abort,
}

impl ExpressionErrorPolicy {
    /// Whether a predicate failure ends the walk
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExpressionErrorPolicy::Abort)
    }
}

/// What to do when a rule action's effector fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectorErrorPolicy {
    /// Stop the walk and return `WalkError::Effector`
    #[default]
    Abort,
    /// Log and record the failure, continue with the next rule and siblings
    Continue,
}

impl EffectorErrorPolicy {
    /// Whether an effector failure ends the walk
    pub fn is_fatal(&self) -> bool {
        matches!(self, EffectorErrorPolicy::Abort)
    }
}
