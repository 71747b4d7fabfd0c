//! Rule expression parser.
//!
//! Recursive descent over the token stream, producing a fully resolved AST:
//! every identifier is bound to a node attribute or helper here, so an
//! expression that compiles can only fail at evaluation time on a type
//! mismatch.
//!
//! ## Grammar
//!
//! ```text
//! <or>      := <and> (("or" | "||") <and>)*
//! <and>     := <not> (("and" | "&&") <not>)*
//! <not>     := ("not" | "!") <not> | <cmp>
//! <cmp>     := <postfix> (<cmp-op> <postfix>)?
//! <postfix> := <primary> ("." ident ["(" <args> ")"])*
//! <primary> := string | number | "true" | "false" | "-" <primary>
//!            | ident ["(" <args> ")"] | "(" <or> ")"
//! ```

use regex::Regex;

use super::eval::Value;
use super::lexer::{Lexer, Spanned, Token};
use crate::errors::ExpressionCause;

const MAX_NESTING: usize = 64;

/// Node attribute readable from an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    Name,
    Parent,
    Index,
    Depth,
    ChildCount,
    IsRoot,
    IsLeaf,
    Translate,
    Rotate,
    Scale,
    JointOrient,
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrMethod {
    EndsWith,
    StartsWith,
    Contains,
    Lower,
    Upper,
}

impl StrMethod {
    fn arity(&self) -> usize {
        match self {
            StrMethod::EndsWith | StrMethod::StartsWith | StrMethod::Contains => 1,
            StrMethod::Lower | StrMethod::Upper => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrMethod::EndsWith => "endswith",
            StrMethod::StartsWith => "startswith",
            StrMethod::Contains => "contains",
            StrMethod::Lower => "lower",
            StrMethod::Upper => "upper",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Attr(Attr),
    Component(Box<Expr>, Axis),
    Not(Box<Expr>),
    Neg(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    Method(Box<Expr>, StrMethod, Vec<Expr>),
    Matches(Box<Expr>, Regex),
    HasPast(Box<Expr>),
    CountPast(Box<Expr>),
    IsBetween(Box<Expr>, Box<Expr>),
}

/// Parse expression text into a resolved AST
pub fn parse(input: &str) -> Result<Expr, ExpressionCause> {
    let tokens = Lexer::new(input).tokenize()?;
    if tokens.is_empty() {
        return Err(syntax(0, "empty expression"));
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: input.len(),
        nesting: 0,
    };
    let expr = parser.parse_or()?;

    if let Some(extra) = parser.peek() {
        return Err(syntax(
            extra.offset,
            format!("unexpected {}", describe(&extra.token)),
        ));
    }

    Ok(expr)
}

fn syntax(offset: usize, message: impl Into<String>) -> ExpressionCause {
    ExpressionCause::Syntax {
        offset,
        message: message.into(),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident(name) => format!("'{}'", name),
        Token::Str(s) => format!("string \"{}\"", s),
        Token::Num(n) => format!("number {}", n),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Bang => "'!'".to_string(),
        Token::AndAnd => "'&&'".to_string(),
        Token::OrOr => "'||'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::EqEq => "'=='".to_string(),
        Token::NotEq => "'!='".to_string(),
        Token::Lt => "'<'".to_string(),
        Token::Le => "'<='".to_string(),
        Token::Gt => "'>'".to_string(),
        Token::Ge => "'>='".to_string(),
    }
}

struct Parser<'t> {
    tokens: &'t [Spanned],
    pos: usize,
    end: usize,
    nesting: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&'t Token> {
        self.peek().map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<&'t Spanned> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn offset(&self) -> usize {
        self.peek().map(|s| s.offset).unwrap_or(self.end)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek_token(), Some(Token::Ident(name)) if name == keyword)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExpressionCause> {
        match self.peek() {
            Some(s) if s.token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(s) => Err(syntax(
                s.offset,
                format!("expected {}, found {}", describe(&expected), describe(&s.token)),
            )),
            None => Err(syntax(
                self.end,
                format!("expected {}, found end of expression", describe(&expected)),
            )),
        }
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExpressionCause>,
    ) -> Result<T, ExpressionCause> {
        if self.nesting >= MAX_NESTING {
            return Err(syntax(self.offset(), "expression nested too deeply"));
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<Expr, ExpressionCause> {
        self.nested(|p| {
            let mut items = vec![p.parse_and()?];
            while p.is_keyword("or") || p.peek_token() == Some(&Token::OrOr) {
                p.advance();
                items.push(p.parse_and()?);
            }
            Ok(if items.len() == 1 {
                items.remove(0)
            } else {
                Expr::Or(items)
            })
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ExpressionCause> {
        let mut items = vec![self.parse_not()?];
        while self.is_keyword("and") || self.peek_token() == Some(&Token::AndAnd) {
            self.advance();
            items.push(self.parse_not()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::And(items)
        })
    }

    fn parse_not(&mut self) -> Result<Expr, ExpressionCause> {
        if self.is_keyword("not") || self.peek_token() == Some(&Token::Bang) {
            self.advance();
            return self.nested(|p| Ok(Expr::Not(Box::new(p.parse_not()?))));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<Expr, ExpressionCause> {
        let lhs = self.parse_postfix()?;
        let op = match self.peek_token() {
            Some(Token::EqEq) => CmpOp::Eq,
            Some(Token::NotEq) => CmpOp::Ne,
            Some(Token::Lt) => CmpOp::Lt,
            Some(Token::Le) => CmpOp::Le,
            Some(Token::Gt) => CmpOp::Gt,
            Some(Token::Ge) => CmpOp::Ge,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_postfix()?;
        Ok(Expr::Compare(Box::new(lhs), op, Box::new(rhs)))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExpressionCause> {
        let expr = self.parse_primary()?;
        let entry = self.nesting;
        let result = self.parse_links(expr);
        self.nesting = entry;
        result
    }

    /// Each `.member` or `.method()` link wraps the receiver, so it counts
    /// toward the nesting bound like a parenthesis does
    fn parse_links(&mut self, mut expr: Expr) -> Result<Expr, ExpressionCause> {
        while self.peek_token() == Some(&Token::Dot) {
            if self.nesting >= MAX_NESTING {
                return Err(syntax(self.offset(), "method chain nested too deeply"));
            }
            self.nesting += 1;
            self.advance();
            let (name, offset) = match self.advance() {
                Some(Spanned {
                    token: Token::Ident(name),
                    offset,
                }) => (name.as_str(), *offset),
                Some(other) => {
                    return Err(syntax(
                        other.offset,
                        format!("expected a name after '.', found {}", describe(&other.token)),
                    ))
                }
                None => return Err(syntax(self.end, "expected a name after '.'")),
            };

            expr = if self.peek_token() == Some(&Token::LParen) {
                let args = self.parse_args()?;
                resolve_method(expr, name, args, offset)?
            } else {
                resolve_member(expr, name)?
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionCause> {
        let Some(spanned) = self.advance() else {
            return Err(syntax(self.end, "unexpected end of expression"));
        };

        match &spanned.token {
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s.clone()))),
            Token::Num(n) => Ok(Expr::Literal(Value::Num(*n))),
            Token::Minus => self.nested(|p| Ok(Expr::Neg(Box::new(p.parse_primary()?)))),
            Token::LParen => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "and" | "or" | "not" => Err(syntax(
                    spanned.offset,
                    format!("unexpected keyword '{}'", name),
                )),
                _ if self.peek_token() == Some(&Token::LParen) => {
                    let args = self.parse_args()?;
                    resolve_call(name, args, spanned.offset)
                }
                _ => resolve_attr(name),
            },
            other => Err(syntax(
                spanned.offset,
                format!("unexpected {}", describe(other)),
            )),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ExpressionCause> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if self.peek_token() == Some(&Token::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_or()?);
            match self.peek_token() {
                Some(Token::Comma) => {
                    self.advance();
                }
                _ => {
                    self.expect(Token::RParen)?;
                    return Ok(args);
                }
            }
        }
    }
}

fn resolve_attr(name: &str) -> Result<Expr, ExpressionCause> {
    let attr = match name {
        "name" => Attr::Name,
        "parent" => Attr::Parent,
        "index" => Attr::Index,
        "depth" => Attr::Depth,
        "child_count" => Attr::ChildCount,
        "is_root" => Attr::IsRoot,
        "is_leaf" => Attr::IsLeaf,
        "translate" => Attr::Translate,
        "rotate" => Attr::Rotate,
        "scale" => Attr::Scale,
        "joint_orient" => Attr::JointOrient,
        "pass" => Attr::Pass,
        _ => return resolve_shorthand(name),
    };
    Ok(Expr::Attr(attr))
}

/// `tx`, `ry`, `sz` and friends
fn resolve_shorthand(name: &str) -> Result<Expr, ExpressionCause> {
    let unknown = || ExpressionCause::UnknownName {
        name: name.to_string(),
    };
    let mut chars = name.chars();
    let (Some(kind), Some(axis), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(unknown());
    };
    let attr = match kind {
        't' => Attr::Translate,
        'r' => Attr::Rotate,
        's' => Attr::Scale,
        _ => return Err(unknown()),
    };
    let axis = axis_from(axis).ok_or_else(unknown)?;
    Ok(Expr::Component(Box::new(Expr::Attr(attr)), axis))
}

fn axis_from(c: char) -> Option<Axis> {
    match c {
        'x' => Some(Axis::X),
        'y' => Some(Axis::Y),
        'z' => Some(Axis::Z),
        _ => None,
    }
}

fn resolve_member(receiver: Expr, name: &str) -> Result<Expr, ExpressionCause> {
    let mut chars = name.chars();
    match (chars.next().and_then(axis_from), chars.next()) {
        (Some(axis), None) => Ok(Expr::Component(Box::new(receiver), axis)),
        _ => Err(ExpressionCause::UnknownName {
            name: format!(".{}", name),
        }),
    }
}

fn check_arity(name: &str, expected: usize, args: &[Expr]) -> Result<(), ExpressionCause> {
    if args.len() != expected {
        return Err(ExpressionCause::Arity {
            name: name.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn resolve_method(
    receiver: Expr,
    name: &str,
    args: Vec<Expr>,
    offset: usize,
) -> Result<Expr, ExpressionCause> {
    let method = match name {
        "endswith" => StrMethod::EndsWith,
        "startswith" => StrMethod::StartsWith,
        "contains" => StrMethod::Contains,
        "lower" => StrMethod::Lower,
        "upper" => StrMethod::Upper,
        "matches" => return compile_matches(receiver, args, offset),
        _ => {
            return Err(ExpressionCause::UnknownName {
                name: format!(".{}", name),
            })
        }
    };
    check_arity(name, method.arity(), &args)?;
    Ok(Expr::Method(Box::new(receiver), method, args))
}

fn resolve_call(name: &str, mut args: Vec<Expr>, offset: usize) -> Result<Expr, ExpressionCause> {
    match name {
        "endswith" | "startswith" | "contains" | "matches" => {
            resolve_method(Expr::Attr(Attr::Name), name, args, offset)
        }
        "has_past" | "count_past" => {
            check_arity(name, 1, &args)?;
            let pred = Box::new(args.remove(0));
            Ok(if name == "has_past" {
                Expr::HasPast(pred)
            } else {
                Expr::CountPast(pred)
            })
        }
        "is_between" => {
            check_arity(name, 2, &args)?;
            let end = Box::new(args.remove(1));
            let start = Box::new(args.remove(0));
            Ok(Expr::IsBetween(start, end))
        }
        _ => Err(ExpressionCause::UnknownName {
            name: name.to_string(),
        }),
    }
}

fn compile_matches(
    receiver: Expr,
    args: Vec<Expr>,
    offset: usize,
) -> Result<Expr, ExpressionCause> {
    check_arity("matches", 1, &args)?;
    let Some(Expr::Literal(Value::Str(pattern))) = args.first() else {
        return Err(syntax(offset, "matches() takes a string literal pattern"));
    };
    let regex = Regex::new(pattern).map_err(|e| ExpressionCause::InvalidRegex {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;
    Ok(Expr::Matches(Box::new(receiver), regex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_and_binds_tighter_than_or() {
        let expr = parse("is_root or is_leaf and depth > 1").unwrap();
        match expr {
            Expr::Or(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(items[1], Expr::And(_)));
            }
            other => panic!("expected Or, got {:?}", other),
        }
    }

    #[test]
    fn test_free_function_targets_name() {
        let expr = parse("endswith(\"_end\")").unwrap();
        match expr {
            Expr::Method(receiver, StrMethod::EndsWith, args) => {
                assert!(matches!(*receiver, Expr::Attr(Attr::Name)));
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_shorthand_and_member_components() {
        assert!(matches!(
            parse("ty").unwrap(),
            Expr::Component(_, Axis::Y)
        ));
        assert!(matches!(
            parse("joint_orient.z").unwrap(),
            Expr::Component(_, Axis::Z)
        ));
        assert!(matches!(
            parse("translate.w").unwrap_err(),
            ExpressionCause::UnknownName { .. }
        ));
    }

    #[test]
    fn test_arity_checked() {
        assert_eq!(
            parse("is_between(endswith(\"a\"))").unwrap_err(),
            ExpressionCause::Arity {
                name: "is_between".to_string(),
                expected: 2,
                found: 1,
            }
        );
        assert!(matches!(
            parse("name.lower(\"x\")").unwrap_err(),
            ExpressionCause::Arity { .. }
        ));
    }

    #[test]
    fn test_matches_requires_literal_and_valid_regex() {
        assert!(matches!(
            parse("matches(name)").unwrap_err(),
            ExpressionCause::Syntax { .. }
        ));
        assert!(matches!(
            parse("matches(\"(\")").unwrap_err(),
            ExpressionCause::InvalidRegex { .. }
        ));
        assert!(matches!(
            parse("parent.matches(\"^spine\\\\d$\")").unwrap(),
            Expr::Matches(_, _)
        ));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse("is_leaf is_root").unwrap_err();
        assert!(matches!(err, ExpressionCause::Syntax { offset: 8, .. }));
    }

    #[test]
    fn test_empty_and_unbalanced() {
        assert!(matches!(
            parse("   ").unwrap_err(),
            ExpressionCause::Syntax { offset: 0, .. }
        ));
        assert!(matches!(
            parse("(is_leaf").unwrap_err(),
            ExpressionCause::Syntax { offset: 8, .. }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}is_leaf{}", "(".repeat(200), ")".repeat(200));
        assert!(matches!(
            parse(&deep).unwrap_err(),
            ExpressionCause::Syntax { .. }
        ));
    }

    #[test]
    fn test_method_chain_counts_toward_nesting() {
        let long = format!("name{} == \"x\"", ".lower()".repeat(500));
        assert!(matches!(
            parse(&long).unwrap_err(),
            ExpressionCause::Syntax { .. }
        ));

        let short = format!("name{}.endswith(\"x\")", ".lower()".repeat(8));
        assert!(parse(&short).is_ok());
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            parse("__import__(\"os\")").unwrap_err(),
            ExpressionCause::UnknownName {
                name: "__import__".to_string()
            }
        );
    }
}
