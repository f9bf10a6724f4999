// SPDX-License-Identifier: MIT

//! Condition expression parser
//!
//! Parses expressions like:
//! - `data.status == 'done'`
//! - `item > 0`
//! - `not (data.score < 0.5 or retries >= 3)`
//!
//! Precedence, loosest first: `or`, `and`, `not`.

use super::ast::{CompareOp, Expression, Literal, Path};
use crate::flow::error::ConditionError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Path(String),
    Str(String),
    Number(f64),
    Op(CompareOp),
    And,
    Or,
    Not,
    True,
    False,
    Null,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Path(p) => p.clone(),
            Token::Str(s) => format!("'{}'", s),
            Token::Number(n) => n.to_string(),
            Token::Op(op) => op.symbol().to_string(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::Not => "not".to_string(),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::Null => "null".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ConditionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match c {
            '(' => {
                chars.next();
                Token::LParen
            }
            ')' => {
                chars.next();
                Token::RParen
            }
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == c {
                        closed = true;
                        break;
                    }
                    text.push(ch);
                }
                if !closed {
                    return Err(ConditionError::UnterminatedString(pos));
                }
                Token::Str(text)
            }
            '=' | '!' | '>' | '<' => {
                chars.next();
                let followed_by_eq = matches!(chars.peek(), Some(&(_, '=')));
                if followed_by_eq {
                    chars.next();
                }
                match (c, followed_by_eq) {
                    ('=', true) => Token::Op(CompareOp::Eq),
                    ('!', true) => Token::Op(CompareOp::NotEq),
                    ('>', true) => Token::Op(CompareOp::Gte),
                    ('<', true) => Token::Op(CompareOp::Lte),
                    ('>', false) => Token::Op(CompareOp::Gt),
                    ('<', false) => Token::Op(CompareOp::Lt),
                    _ => {
                        return Err(ConditionError::UnexpectedToken {
                            token: c.to_string(),
                            position: pos,
                        })
                    }
                }
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut text = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' || (ch == '-' && text.is_empty()) {
                        text.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number = text
                    .parse::<f64>()
                    .map_err(|_| ConditionError::InvalidNumber(text.clone()))?;
                Token::Number(number)
            }
            c if is_path_char(c) => {
                let mut word = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if !is_path_char(ch) {
                        break;
                    }
                    word.push(ch);
                    chars.next();
                }
                match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    "contains" => Token::Op(CompareOp::Contains),
                    _ => Token::Path(word),
                }
            }
            other => {
                return Err(ConditionError::UnexpectedToken {
                    token: other.to_string(),
                    position: pos,
                })
            }
        };
        tokens.push((pos, token));
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn advance(&mut self) -> Option<(usize, Token)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn unexpected(position: usize, token: &Token) -> ConditionError {
        ConditionError::UnexpectedToken {
            token: token.describe(),
            position,
        }
    }

    fn parse_or(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ConditionError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, ConditionError> {
        let (position, token) = self.advance().ok_or(ConditionError::UnexpectedEnd)?;
        match token {
            Token::LParen => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some((_, Token::RParen)) => Ok(inner),
                    Some((pos, other)) => Err(Self::unexpected(pos, &other)),
                    None => Err(ConditionError::UnexpectedEnd),
                }
            }
            Token::True => Ok(Expression::Const(true)),
            Token::False => Ok(Expression::Const(false)),
            Token::Path(path) => self.parse_comparison(path),
            other => Err(Self::unexpected(position, &other)),
        }
    }

    fn parse_comparison(&mut self, path: String) -> Result<Expression, ConditionError> {
        let path = Path::parse(&path);
        let op = match self.peek() {
            Some(Token::Op(op)) => *op,
            _ => return Ok(Expression::Truthy(path)),
        };
        self.advance();

        let (position, token) = self.advance().ok_or(ConditionError::UnexpectedEnd)?;
        let value = match token {
            Token::Str(s) => Literal::String(s),
            Token::Number(n) => Literal::Number(n),
            Token::True => Literal::Boolean(true),
            Token::False => Literal::Boolean(false),
            Token::Null => Literal::Null,
            other => return Err(Self::unexpected(position, &other)),
        };
        Ok(Expression::Compare { path, op, value })
    }
}

/// Parse a condition expression string into an AST
pub fn parse(input: &str) -> Result<Expression, ConditionError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ConditionError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;

    match parser.advance() {
        None => Ok(expr),
        Some((position, token)) => Err(Parser::unexpected(position, &token)),
    }
}
