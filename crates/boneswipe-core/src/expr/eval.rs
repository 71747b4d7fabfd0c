//! Rule expression interpreter.
//!
//! Evaluates a parsed AST against a lineage (root first, subject last). Only
//! node attributes and the path helpers are reachable, so evaluation has no
//! side effects.
//!
//! Every scope a path helper hands to its sub-predicate is a prefix of the
//! same lineage, so a sub-predicate's result depends only on the prefix
//! length. Results are memoized per (sub-predicate, length) for the duration
//! of one evaluation, which keeps nested helpers polynomial in path length.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::helpers;
use super::parser::{Attr, Axis, CmpOp, Expr, StrMethod};
use crate::errors::ExpressionCause;
use crate::model::{Node, Vec3};
use crate::traversal::Pass;

/// Runtime value of a sub-expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
    Vec(Vec3),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Num(_) => "number",
            Value::Bool(_) => "bool",
            Value::Vec(_) => "vector",
        }
    }
}

fn mismatch(message: impl Into<String>) -> ExpressionCause {
    ExpressionCause::TypeMismatch {
        message: message.into(),
    }
}

/// Sub-predicate results keyed by AST node address and prefix length
type Memo = Rc<RefCell<HashMap<(usize, usize), bool>>>;

/// Evaluates expressions for one subject
pub struct Evaluator<'n> {
    lineage: &'n [&'n Node],
    pass: Pass,
    memo: Memo,
}

impl<'n> Evaluator<'n> {
    /// `lineage` must be non-empty; its last element is the subject
    pub fn new(lineage: &'n [&'n Node], pass: Pass) -> Self {
        Self {
            lineage,
            pass,
            memo: Memo::default(),
        }
    }

    /// Evaluate a predicate, requiring a boolean result
    pub fn test(&self, expr: &Expr) -> Result<bool, ExpressionCause> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(format!(
                "expected a bool, got {}",
                other.type_name()
            ))),
        }
    }

    fn subject(&self) -> Result<&'n Node, ExpressionCause> {
        self.lineage
            .last()
            .copied()
            .ok_or_else(|| mismatch("no node to evaluate against"))
    }

    /// Evaluator for a prefix of this lineage
    fn scoped<'s>(&self, scope: &'s [&'s Node]) -> Evaluator<'s> {
        Evaluator {
            lineage: scope,
            pass: self.pass,
            memo: Rc::clone(&self.memo),
        }
    }

    /// Test `pred` with `scope` as the lineage, reusing an earlier result
    fn test_in(&self, pred: &Expr, scope: &[&Node]) -> Result<bool, ExpressionCause> {
        let key = (pred as *const Expr as usize, scope.len());
        if let Some(&known) = self.memo.borrow().get(&key) {
            return Ok(known);
        }
        let result = self.scoped(scope).test(pred)?;
        self.memo.borrow_mut().insert(key, result);
        Ok(result)
    }

    fn eval(&self, expr: &Expr) -> Result<Value, ExpressionCause> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Attr(attr) => self.attr(*attr),
            Expr::Component(inner, axis) => match self.eval(inner)? {
                Value::Vec(v) => Ok(Value::Num(match axis {
                    Axis::X => v.x,
                    Axis::Y => v.y,
                    Axis::Z => v.z,
                })),
                other => Err(mismatch(format!(
                    "component access on {}",
                    other.type_name()
                ))),
            },
            Expr::Not(inner) => Ok(Value::Bool(!self.test(inner)?)),
            Expr::Neg(inner) => match self.eval(inner)? {
                Value::Num(n) => Ok(Value::Num(-n)),
                other => Err(mismatch(format!("cannot negate {}", other.type_name()))),
            },
            Expr::And(items) => {
                for item in items {
                    if !self.test(item)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Expr::Or(items) => {
                for item in items {
                    if self.test(item)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Expr::Compare(lhs, op, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                compare(&lhs, *op, &rhs).map(Value::Bool)
            }
            Expr::Method(receiver, method, args) => self.method(receiver, *method, args),
            Expr::Matches(receiver, regex) => match self.eval(receiver)? {
                Value::Str(s) => Ok(Value::Bool(regex.is_match(&s))),
                other => Err(mismatch(format!(
                    "matches() called on {}",
                    other.type_name()
                ))),
            },
            Expr::HasPast(pred) => {
                helpers::has_past(self.lineage, |scope| self.test_in(pred, scope))
                    .map(Value::Bool)
            }
            Expr::CountPast(pred) => {
                helpers::count_past(self.lineage, |scope| self.test_in(pred, scope))
                    .map(|n| Value::Num(n as f64))
            }
            Expr::IsBetween(start, end) => helpers::is_between(
                self.lineage,
                |scope| self.test_in(start, scope),
                |scope| self.test_in(end, scope),
            )
            .map(Value::Bool),
        }
    }

    fn attr(&self, attr: Attr) -> Result<Value, ExpressionCause> {
        let node = self.subject()?;
        Ok(match attr {
            Attr::Name => Value::Str(node.id.clone()),
            Attr::Parent => Value::Str(node.parent_id.clone()),
            Attr::Index => Value::Num(f64::from(node.index)),
            Attr::Depth => Value::Num(node.depth as f64),
            Attr::ChildCount => Value::Num(node.child_count as f64),
            Attr::IsRoot => Value::Bool(node.is_root()),
            Attr::IsLeaf => Value::Bool(node.is_leaf()),
            Attr::Translate => Value::Vec(node.translation),
            Attr::Rotate => Value::Vec(node.rotation),
            Attr::Scale => Value::Vec(node.scale),
            Attr::JointOrient => Value::Vec(node.joint_orient),
            Attr::Pass => Value::Str(self.pass.to_string()),
        })
    }

    fn method(
        &self,
        receiver: &Expr,
        method: StrMethod,
        args: &[Expr],
    ) -> Result<Value, ExpressionCause> {
        let Value::Str(s) = self.eval(receiver)? else {
            return Err(mismatch(format!("{}() needs a string receiver", method.name())));
        };

        let arg = |i: usize| -> Result<String, ExpressionCause> {
            match args.get(i).map(|a| self.eval(a)).transpose()? {
                Some(Value::Str(a)) => Ok(a),
                Some(other) => Err(mismatch(format!(
                    "{}() expects a string argument, got {}",
                    method.name(),
                    other.type_name()
                ))),
                None => Err(mismatch(format!("{}() is missing an argument", method.name()))),
            }
        };

        Ok(match method {
            StrMethod::EndsWith => Value::Bool(s.ends_with(arg(0)?.as_str())),
            StrMethod::StartsWith => Value::Bool(s.starts_with(arg(0)?.as_str())),
            StrMethod::Contains => Value::Bool(s.contains(arg(0)?.as_str())),
            StrMethod::Lower => Value::Str(s.to_lowercase()),
            StrMethod::Upper => Value::Str(s.to_uppercase()),
        })
    }
}

fn compare(lhs: &Value, op: CmpOp, rhs: &Value) -> Result<bool, ExpressionCause> {
    use std::cmp::Ordering;

    let ordering = match (lhs, rhs) {
        (Value::Num(a), Value::Num(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(_), Value::Bool(_)) | (Value::Vec(_), Value::Vec(_)) => {
            return match op {
                CmpOp::Eq => Ok(lhs == rhs),
                CmpOp::Ne => Ok(lhs != rhs),
                _ => Err(mismatch(format!(
                    "{} values only support == and !=",
                    lhs.type_name()
                ))),
            };
        }
        _ => {
            return Err(mismatch(format!(
                "cannot compare {} with {}",
                lhs.type_name(),
                rhs.type_name()
            )))
        }
    };

    // NaN compares unequal to everything
    let Some(ordering) = ordering else {
        return Ok(op == CmpOp::Ne);
    };

    Ok(match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Ne => ordering != Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
    })
}
