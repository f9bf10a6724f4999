// SPDX-License-Identifier: MIT

//! Condition syntax tree
//!
//! A path keeps its root segment apart from the remaining segments. At
//! evaluation time the root is matched against the scope binding (`data`,
//! `item`) to pick between the value under test and the run state.

use std::fmt;

/// A dotted path such as `data.result.tags`, `item` or `retries`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub root: String,
    /// Segments after the root, still dot-separated
    pub rest: Option<String>,
}

impl Path {
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((root, rest)) => Self {
                root: root.to_string(),
                rest: Some(rest.to_string()),
            },
            None => Self {
                root: text.to_string(),
                rest: None,
            },
        }
    }

    pub fn is_bound_to(&self, binding: &str) -> bool {
        self.root == binding
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rest {
            Some(rest) => write!(f, "{}.{}", self.root, rest),
            None => f.write_str(&self.root),
        }
    }
}

/// A parsed condition
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `path op literal`
    Compare {
        path: Path,
        op: CompareOp,
        value: Literal,
    },
    /// A bare path; holds when the value it names is truthy
    Truthy(Path),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    /// `true` or `false` written directly
    Const(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Substring for strings, membership for arrays
    Contains,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Contains => "contains",
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}
