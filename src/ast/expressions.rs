use std::fmt;

use crate::{
    ast::{BinOp, UnaryOp},
    implicit::ImplicitObject,
    lexer::Lexer,
    value::Value,
};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Trees are immutable once built; evaluation only reads them, so a parsed
/// expression can be shared between threads rendering different pages.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant value: string, number, boolean or null
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// 42
    /// true
    /// ```
    Literal(Value),

    /// One of the fixed implicit objects
    ///
    /// # Example
    /// ```text
    /// param
    /// session
    /// ```
    ImplicitObject(ImplicitObject),

    /// Bare identifier looked up through page, request, session and
    /// application scope
    ///
    /// # Example
    /// ```text
    /// user
    /// ```
    Variable(String),

    /// Property or index access
    ///
    /// `a.b` is stored with a string literal key, so `a.b` and `a["b"]`
    /// produce the same tree.
    ///
    /// # Examples
    /// ```text
    /// user.name
    /// items[0]
    /// param["id"]
    /// ```
    Access {
        object: Box<Expr>,
        key: Box<Expr>,
    },

    /// Binary operation (arithmetic, comparison, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Prefix operation
    ///
    /// # Examples
    /// ```text
    /// -price
    /// !done
    /// empty cart.items
    /// ```
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Ternary conditional
    ///
    /// # Example
    /// ```text
    /// user.admin ? "Admin" : "Guest"
    /// ```
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

impl Expr {
    pub fn access(object: Expr, key: Expr) -> Self {
        Expr::Access {
            object: Box::new(object),
            key: Box::new(key),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }
}

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !Lexer::is_keyword(s)
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => {
            f.write_str("\"")?;
            for ch in s.chars() {
                match ch {
                    '"' => f.write_str("\\\"")?,
                    '\\' => f.write_str("\\\\")?,
                    c => write!(f, "{}", c)?,
                }
            }
            f.write_str("\"")
        }
        Value::Null => f.write_str("null"),
        other => write!(f, "{}", other),
    }
}

/// Renders the canonical expression text, used in diagnostics.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write_literal(f, value),
            Expr::ImplicitObject(obj) => f.write_str(obj.name()),
            Expr::Variable(name) => f.write_str(name),
            Expr::Access { object, key } => {
                // a prefix operator binds looser than access
                if matches!(object.as_ref(), Expr::UnaryOp { .. }) {
                    write!(f, "({})", object)?;
                } else {
                    write!(f, "{}", object)?;
                }
                match key.as_ref() {
                    Expr::Literal(Value::String(name)) if is_plain_identifier(name) => {
                        write!(f, ".{}", name)
                    }
                    _ => write!(f, "[{}]", key),
                }
            }
            Expr::BinaryOp { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::UnaryOp { op, operand } => write!(f, "{}{}", op, operand),
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "({} ? {} : {})", condition, then_branch, else_branch),
        }
    }
}
