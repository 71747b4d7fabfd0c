//! Predicate expression language
//!
//! Rules may be written as short text predicates instead of native closures:
//!
//! ```text
//! endswith("_end")
//! depth > 2 and not has_past(name == "hips")
//! is_between(startswith("arm"), endswith("_end")) || parent.matches("^spine\d$")
//! ```
//!
//! Text is compiled once into an `Expression` and evaluated per node. The
//! language can only read node attributes and query the ancestor path; it has
//! no assignment, no calls into the host and no I/O.

pub mod helpers;
mod eval;
mod lexer;
mod parser;

use std::str::FromStr;

use crate::errors::{ExpressionCause, ExpressionError};
use crate::model::Node;
use crate::traversal::{Pass, TraversalContext};

pub use eval::Value;

/// A compiled predicate
#[derive(Debug, Clone)]
pub struct Expression {
    text: String,
    root: parser::Expr,
}

impl Expression {
    /// Compile predicate text
    ///
    /// # Errors
    ///
    /// Returns `ExpressionError` for syntax errors, unknown names, wrong
    /// argument counts and invalid regex patterns.
    pub fn compile(text: &str) -> Result<Self, ExpressionError> {
        let root = parser::parse(text).map_err(|cause| ExpressionError::new(text, cause))?;
        Ok(Self {
            text: text.to_string(),
            root,
        })
    }

    /// Source text this expression was compiled from
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Evaluate against the node a rule is running on
    ///
    /// # Errors
    ///
    /// Returns `ExpressionError` with a `TypeMismatch` cause when operand
    /// types do not fit their operator.
    pub fn evaluate(&self, ctx: &TraversalContext<'_>) -> Result<bool, ExpressionError> {
        let lineage = ctx.lineage();
        self.evaluate_for(&lineage, ctx.pass())
    }

    /// Evaluate against an explicit lineage (root first, subject last)
    ///
    /// # Errors
    ///
    /// As `evaluate`; an empty lineage is a type mismatch.
    pub fn evaluate_for(&self, lineage: &[&Node], pass: Pass) -> Result<bool, ExpressionError> {
        if lineage.is_empty() {
            return Err(self.error(ExpressionCause::TypeMismatch {
                message: "no node to evaluate against".to_string(),
            }));
        }
        eval::Evaluator::new(lineage, pass)
            .test(&self.root)
            .map_err(|cause| self.error(cause))
    }

    fn error(&self, cause: ExpressionCause) -> ExpressionError {
        ExpressionError::new(self.text.clone(), cause)
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compile and evaluate in one step
///
/// # Errors
///
/// Returns any compile or evaluation error.
pub fn evaluate(text: &str, ctx: &TraversalContext<'_>) -> Result<bool, ExpressionError> {
    Expression::compile(text)?.evaluate(ctx)
}
