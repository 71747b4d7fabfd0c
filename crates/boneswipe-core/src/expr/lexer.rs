//! Rule expression lexer.
//!
//! Tokenizes predicate strings like `name.endswith("_end") and depth > 2`.

use crate::errors::ExpressionCause;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Comma,
    Dot,
    Bang,   // !
    AndAnd, // &&
    OrOr,   // ||
    Minus,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Ident(String), // also carries keywords: and, or, not, true, false
    Str(String),
    Num(f64),
}

/// A token with the byte offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub struct Lexer<'a> {
    input: &'a [u8],
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            source: input,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.pos + ahead).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ExpressionCause {
        ExpressionCause::Syntax {
            offset,
            message: message.into(),
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, ExpressionCause> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek() else { break };
            let offset = self.pos;

            let token = match ch {
                b'(' => self.single(Token::LParen),
                b')' => self.single(Token::RParen),
                b',' => self.single(Token::Comma),
                b'-' => self.single(Token::Minus),
                b'.' if !self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.single(Token::Dot)
                }
                b'!' => self.one_or_two(b'=', Token::NotEq, Token::Bang),
                b'<' => self.one_or_two(b'=', Token::Le, Token::Lt),
                b'>' => self.one_or_two(b'=', Token::Ge, Token::Gt),
                b'=' => {
                    if self.peek_at(1) == Some(b'=') {
                        self.pos += 2;
                        Token::EqEq
                    } else {
                        return Err(self.error(offset, "single '=' is not an operator, use '=='"));
                    }
                }
                b'&' => self.doubled(b'&', Token::AndAnd)?,
                b'|' => self.doubled(b'|', Token::OrOr)?,
                b'"' | b'\'' => self.read_string(ch)?,
                c if c.is_ascii_digit() || c == b'.' => self.read_number()?,
                c if c.is_ascii_alphabetic() || c == b'_' => self.read_ident(),
                _ => {
                    let shown = self.source[offset..].chars().next().unwrap_or('?');
                    return Err(self.error(offset, format!("unexpected character '{}'", shown)));
                }
            };

            tokens.push(Spanned { token, offset });
        }

        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn one_or_two(&mut self, second: u8, two: Token, one: Token) -> Token {
        if self.peek_at(1) == Some(second) {
            self.pos += 2;
            two
        } else {
            self.pos += 1;
            one
        }
    }

    fn doubled(&mut self, ch: u8, token: Token) -> Result<Token, ExpressionCause> {
        if self.peek_at(1) == Some(ch) {
            self.pos += 2;
            Ok(token)
        } else {
            Err(self.error(
                self.pos,
                format!("expected '{0}{0}'", ch as char),
            ))
        }
    }

    fn read_string(&mut self, quote: u8) -> Result<Token, ExpressionCause> {
        let start = self.pos;
        self.pos += 1;
        let mut bytes = Vec::new();

        loop {
            let Some(ch) = self.peek() else {
                return Err(self.error(start, "unterminated string literal"));
            };
            self.pos += 1;
            match ch {
                c if c == quote => break,
                b'\\' => {
                    let Some(escaped) = self.peek() else {
                        return Err(self.error(start, "unterminated string literal"));
                    };
                    self.pos += 1;
                    match escaped {
                        b'n' => bytes.push(b'\n'),
                        b't' => bytes.push(b'\t'),
                        b'\\' | b'"' | b'\'' => bytes.push(escaped),
                        other => {
                            return Err(self.error(
                                self.pos - 2,
                                format!("unknown escape '\\{}'", other as char),
                            ))
                        }
                    }
                }
                other => bytes.push(other),
            }
        }

        // Only ASCII bytes were substituted, so UTF-8 sequences are intact.
        Ok(Token::Str(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn read_number(&mut self) -> Result<Token, ExpressionCause> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        text.parse::<f64>()
            .map(Token::Num)
            .map_err(|_| self.error(start, format!("invalid number '{}'", text)))
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Token::Ident(self.source[start..self.pos].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_method_call() {
        assert_eq!(
            tokens("name.endswith(\"_end\")"),
            vec![
                Token::Ident("name".into()),
                Token::Dot,
                Token::Ident("endswith".into()),
                Token::LParen,
                Token::Str("_end".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokens("a <= 1 && !b || c != 2.5"),
            vec![
                Token::Ident("a".into()),
                Token::Le,
                Token::Num(1.0),
                Token::AndAnd,
                Token::Bang,
                Token::Ident("b".into()),
                Token::OrOr,
                Token::Ident("c".into()),
                Token::NotEq,
                Token::Num(2.5),
            ]
        );
    }

    #[test]
    fn test_single_quoted_string_with_escape() {
        assert_eq!(tokens(r"'it\'s'"), vec![Token::Str("it's".into())]);
    }

    #[test]
    fn test_leading_dot_number() {
        assert_eq!(tokens(".5"), vec![Token::Num(0.5)]);
    }

    #[test]
    fn test_unterminated_string_reports_offset() {
        let err = Lexer::new("name == \"abc").tokenize().unwrap_err();
        assert!(matches!(err, ExpressionCause::Syntax { offset: 8, .. }));
    }

    #[test]
    fn test_single_equals_rejected() {
        let err = Lexer::new("depth = 2").tokenize().unwrap_err();
        assert!(matches!(err, ExpressionCause::Syntax { offset: 6, .. }));
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("name @ 1").tokenize().unwrap_err();
        assert!(matches!(err, ExpressionCause::Syntax { offset: 5, .. }));
    }
}
