//! Recoverable evaluation failures.
//!
//! Evaluation-time problems never abort rendering: each one is logged,
//! collected as a [`Diagnostic`], and replaced by a default value. Only in
//! strict mode does the first one become an [`EvalError`].

use std::fmt;

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// An operand could not be converted to the type an operator needs
    CoercionFailure,
    /// A bean property is missing or its getter failed
    PropertyAccessFailure,
    /// Division or modulo by zero
    ArithmeticFailure,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::CoercionFailure => "coercion failure",
            DiagnosticKind::PropertyAccessFailure => "property access failure",
            DiagnosticKind::ArithmeticFailure => "arithmetic failure",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Canonical text of the sub-expression that failed
    pub expression: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in '{}': {}", self.kind, self.expression, self.message)
    }
}

/// Strict-mode evaluation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EvalError(pub Diagnostic);

impl EvalError {
    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }
}

/// Result of a lenient evaluation: the value plus whatever went wrong on
/// the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub diagnostics: Vec<Diagnostic>,
}

impl Evaluation {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    /// The value coerced for page output (null → "").
    pub fn to_output_string(&self) -> String {
        self.value.to_string()
    }
}
