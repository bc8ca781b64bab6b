use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::{
    ast::{BinOp, Expr, UnaryOp},
    coercion::{self, Number},
    context::ResolutionContext,
    diagnostics::{Diagnostic, DiagnosticKind, EvalError, Evaluation},
    parser::{Template, TemplatePart},
    resolver,
    value::{PropertyError, Value},
};

/// Walks a parsed expression against one resolution context.
///
/// An evaluator is created per evaluation and consumed by it; the tree is
/// only read, so the same [`Expr`] can be evaluated concurrently against
/// different contexts.
///
/// # Examples
///
/// ```
/// use jstl_el::{Evaluator, PageContext, parse_expression, Value};
///
/// let mut ctx = PageContext::new();
/// ctx.set_query_string("id=5");
///
/// let expr = parse_expression("param.id == 5").unwrap();
/// let result = Evaluator::new(&ctx).evaluate(&expr).unwrap();
/// assert_eq!(result.value, Value::Boolean(true));
/// assert!(result.is_clean());
/// ```
pub struct Evaluator<'ctx> {
    ctx: &'ctx dyn ResolutionContext,
    strict: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'ctx> Evaluator<'ctx> {
    pub fn new(ctx: &'ctx dyn ResolutionContext) -> Self {
        Evaluator {
            ctx,
            strict: false,
            diagnostics: Vec::new(),
        }
    }

    /// In strict mode the first recoverable failure aborts evaluation.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn evaluate(mut self, expr: &Expr) -> Result<Evaluation, EvalError> {
        let value = self.eval_expr(expr)?;
        Ok(Evaluation {
            value,
            diagnostics: self.diagnostics,
        })
    }

    /// Evaluates template text. A lone `${...}` yields its typed value;
    /// mixed text yields the concatenated string.
    pub fn evaluate_template(mut self, template: &Template) -> Result<Evaluation, EvalError> {
        let value = match template {
            Template::Literal(text) => Value::String(text.clone()),
            Template::Expression(expr) => self.eval_expr(expr)?,
            Template::Composite(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => out.push_str(text),
                        TemplatePart::Expression(expr) => {
                            out.push_str(&self.eval_expr(expr)?.to_string());
                        }
                    }
                }
                Value::String(out)
            }
        };
        Ok(Evaluation {
            value,
            diagnostics: self.diagnostics,
        })
    }

    /// Records a recoverable failure and substitutes `default`.
    fn recover(
        &mut self,
        kind: DiagnosticKind,
        expr: &Expr,
        message: String,
        default: Value,
    ) -> Result<Value, EvalError> {
        let diagnostic = Diagnostic {
            kind,
            message,
            expression: expr.to_string(),
        };
        match kind {
            DiagnosticKind::CoercionFailure => log::debug!("{}", diagnostic),
            _ => log::warn!("{}", diagnostic),
        }
        if self.strict {
            return Err(EvalError(diagnostic));
        }
        self.diagnostics.push(diagnostic);
        Ok(default)
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::ImplicitObject(obj) => Ok(obj.resolve(self.ctx)),
            Expr::Variable(name) => {
                Ok(resolver::resolve_identifier(name, self.ctx).unwrap_or(Value::Null))
            }
            Expr::Access { object, key } => {
                let obj_value = self.eval_expr(object)?;
                if obj_value.is_null() {
                    return Ok(Value::Null);
                }
                let key_value = self.eval_expr(key)?;
                if key_value.is_null() {
                    return Ok(Value::Null);
                }
                self.apply_access(expr, &obj_value, &key_value)
            }
            Expr::BinaryOp { op: BinOp::And, left, right } => {
                if !coercion::to_boolean(&self.eval_expr(left)?) {
                    return Ok(Value::Boolean(false));
                }
                let right_val = self.eval_expr(right)?;
                Ok(Value::Boolean(coercion::to_boolean(&right_val)))
            }
            Expr::BinaryOp { op: BinOp::Or, left, right } => {
                if coercion::to_boolean(&self.eval_expr(left)?) {
                    return Ok(Value::Boolean(true));
                }
                let right_val = self.eval_expr(right)?;
                Ok(Value::Boolean(coercion::to_boolean(&right_val)))
            }
            Expr::BinaryOp { op, left, right } => {
                let left_val = self.eval_expr(left)?;
                let right_val = self.eval_expr(right)?;
                self.apply_binop(expr, *op, &left_val, &right_val)
            }
            Expr::UnaryOp { op, operand } => {
                let value = self.eval_expr(operand)?;
                self.apply_unary(expr, *op, &value)
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if coercion::to_boolean(&self.eval_expr(condition)?) {
                    self.eval_expr(then_branch)
                } else {
                    self.eval_expr(else_branch)
                }
            }
        }
    }

    fn apply_access(&mut self, expr: &Expr, object: &Value, key: &Value) -> Result<Value, EvalError> {
        match object {
            Value::Object(map) => Ok(map.get(&coercion::to_key(key)).cloned().unwrap_or(Value::Null)),
            Value::Array(arr) => match coercion::to_index(key) {
                Ok(index) => Ok(usize::try_from(index)
                    .ok()
                    .and_then(|i| arr.get(i))
                    .cloned()
                    .unwrap_or(Value::Null)),
                Err(e) => self.recover(DiagnosticKind::CoercionFailure, expr, e.to_string(), Value::Null),
            },
            Value::Bean(bean) => {
                let name = coercion::to_key(key);
                match bean.property(&name) {
                    Ok(value) => Ok(value),
                    Err(PropertyError::NotFound) => self.recover(
                        DiagnosticKind::PropertyAccessFailure,
                        expr,
                        format!("{} has no readable property '{}'", bean.type_name(), name),
                        Value::Null,
                    ),
                    Err(err @ PropertyError::Getter(_)) => self.recover(
                        DiagnosticKind::PropertyAccessFailure,
                        expr,
                        format!("reading '{}' on {}: {}", name, bean.type_name(), err),
                        Value::Null,
                    ),
                }
            }
            other => self.recover(
                DiagnosticKind::PropertyAccessFailure,
                expr,
                format!(
                    "cannot read property '{}' of {}",
                    coercion::to_key(key),
                    other.type_name()
                ),
                Value::Null,
            ),
        }
    }

    fn apply_unary(&mut self, expr: &Expr, op: UnaryOp, value: &Value) -> Result<Value, EvalError> {
        match op {
            UnaryOp::Not => Ok(Value::Boolean(!coercion::to_boolean(value))),
            UnaryOp::Empty => Ok(Value::Boolean(value.is_empty())),
            UnaryOp::Negate => match coercion::to_number(value) {
                Ok(Number::Integer(n)) => Ok(n
                    .checked_neg()
                    .map(Value::Integer)
                    .unwrap_or(Value::Float(-(n as f64)))),
                Ok(Number::Float(n)) => Ok(Value::Float(-n)),
                Err(e) => self.recover(
                    DiagnosticKind::CoercionFailure,
                    expr,
                    format!("operator -: {}", e),
                    Value::Null,
                ),
            },
        }
    }

    fn apply_binop(&mut self, expr: &Expr, op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        match op {
            BinOp::Add | BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Modulo => {
                self.arithmetic(expr, op, left, right)
            }
            BinOp::Equal => Ok(Value::Boolean(values_equal(left, right))),
            BinOp::NotEqual => Ok(Value::Boolean(!values_equal(left, right))),
            BinOp::LessThan | BinOp::GreaterThan | BinOp::LessEqual | BinOp::GreaterEqual => {
                self.compare(expr, op, left, right)
            }
            BinOp::And | BinOp::Or => unreachable!("logical operators short-circuit in eval_expr"),
        }
    }

    fn arithmetic(&mut self, expr: &Expr, op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        let (a, b) = match (coercion::to_number(left), coercion::to_number(right)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                return self.recover(
                    DiagnosticKind::CoercionFailure,
                    expr,
                    format!("operator {}: {}", op, e),
                    Value::Null,
                );
            }
        };

        let divides = matches!(op, BinOp::Divide | BinOp::Modulo);
        if divides && b.as_f64() == 0.0 {
            let what = if op == BinOp::Divide { "division" } else { "modulo" };
            return self.recover(
                DiagnosticKind::ArithmeticFailure,
                expr,
                format!("{} by zero", what),
                Value::Null,
            );
        }

        match (a, b) {
            (Number::Integer(x), Number::Integer(y)) => Ok(integer_arithmetic(op, x, y)),
            _ => Ok(Value::Float(float_arithmetic(op, a, b))),
        }
    }

    fn compare(&mut self, expr: &Expr, op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if left.is_null() || right.is_null() {
            return Ok(Value::Boolean(false));
        }

        let ordering = match (left, right) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (a, b) if a.is_number() || b.is_number() => {
                match (coercion::to_number(a), coercion::to_number(b)) {
                    (Ok(x), Ok(y)) => compare_numbers(x, y),
                    (Err(e), _) | (_, Err(e)) => {
                        return self.recover(
                            DiagnosticKind::CoercionFailure,
                            expr,
                            format!("operator {}: {}", op, e),
                            Value::Boolean(false),
                        );
                    }
                }
            }
            (a, b) => {
                return self.recover(
                    DiagnosticKind::CoercionFailure,
                    expr,
                    format!("cannot order {} {} {}", a.type_name(), op, b.type_name()),
                    Value::Boolean(false),
                );
            }
        };

        let result = ordering.is_some_and(|ord| match op {
            BinOp::LessThan => ord == Ordering::Less,
            BinOp::GreaterThan => ord == Ordering::Greater,
            BinOp::LessEqual => ord != Ordering::Greater,
            BinOp::GreaterEqual => ord != Ordering::Less,
            _ => false,
        });
        Ok(Value::Boolean(result))
    }
}

fn integer_arithmetic(op: BinOp, x: i64, y: i64) -> Value {
    let exact = match op {
        BinOp::Add => x.checked_add(y),
        BinOp::Subtract => x.checked_sub(y),
        BinOp::Multiply => x.checked_mul(y),
        // Exact quotients stay integral; 7 / 2 is 3.5
        BinOp::Divide => x.checked_rem(y).filter(|r| *r == 0).and_then(|_| x.checked_div(y)),
        BinOp::Modulo => x.checked_rem(y),
        _ => None,
    };
    match exact {
        Some(n) => Value::Integer(n),
        None => Value::Float(float_arithmetic(op, Number::Integer(x), Number::Integer(y))),
    }
}

/// Largest scale a `Decimal` holds without rounding.
const MAX_DECIMAL_SCALE: u32 = 28;

/// Decimal form of `n`, only when the conversion is lossless.
fn to_decimal(n: Number) -> Option<Decimal> {
    match n {
        Number::Integer(i) => Decimal::from_i64(i),
        Number::Float(f) => Decimal::from_f64(f).filter(|d| d.to_f64() == Some(f)),
    }
}

/// Floating-point arithmetic routed through decimals when both operands
/// convert exactly and the decimal result is exact, so `0.1 + 0.2` is `0.3`.
/// Anything else is computed in `f64`.
fn float_arithmetic(op: BinOp, a: Number, b: Number) -> f64 {
    let exact = to_decimal(a).zip(to_decimal(b)).and_then(|(ad, bd)| match op {
        BinOp::Add => ad.checked_add(bd),
        BinOp::Subtract => ad.checked_sub(bd),
        BinOp::Multiply if ad.scale() + bd.scale() <= MAX_DECIMAL_SCALE => ad.checked_mul(bd),
        // a quotient that does not multiply back is a rounded 28-digit value
        BinOp::Divide => ad.checked_div(bd).filter(|q| q.checked_mul(bd) == Some(ad)),
        BinOp::Modulo => ad.checked_rem(bd),
        _ => None,
    });
    if let Some(result) = exact.and_then(|d| d.to_f64()) {
        return result;
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    match op {
        BinOp::Add => x + y,
        BinOp::Subtract => x - y,
        BinOp::Multiply => x * y,
        BinOp::Divide => x / y,
        BinOp::Modulo => x % y,
        _ => f64::NAN,
    }
}

fn compare_numbers(a: Number, b: Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Integer(x), Number::Integer(y)) => Some(x.cmp(&y)),
        _ => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

/// `==` semantics. Never fails: operands that cannot be coerced to a common
/// type fall back to plain value equality.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (a, b) if a.is_number() || b.is_number() => {
            match (coercion::to_number(a), coercion::to_number(b)) {
                (Ok(x), Ok(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
                _ => a == b,
            }
        }
        (Value::Boolean(b), Value::String(s)) | (Value::String(s), Value::Boolean(b)) => {
            coercion::parse_boolean(s) == Some(*b)
        }
        (a, b) => a == b,
    }
}

/// Lenient evaluation: failures become diagnostics, never errors.
pub fn evaluate(expr: &Expr, ctx: &dyn ResolutionContext) -> Evaluation {
    Evaluator::new(ctx)
        .evaluate(expr)
        .unwrap_or_else(|err| Evaluation {
            value: Value::Null,
            diagnostics: vec![err.0],
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::PageContext, parser::parse_expression};

    fn eval(src: &str) -> Evaluation {
        let ctx = PageContext::new();
        evaluate(&parse_expression(src).unwrap(), &ctx)
    }

    #[test]
    fn test_integer_division() {
        assert_eq!(eval("10 / 2").value, Value::Integer(5));
        assert_eq!(eval("7 / 2").value, Value::Float(3.5));
        assert_eq!(eval("7 div 2").value, Value::Float(3.5));
    }

    #[test]
    fn test_decimal_float_addition() {
        assert_eq!(eval("0.1 + 0.2").value, Value::Float(0.3));
        assert_eq!(eval("1.5 * 2").value, Value::Float(3.0));
    }

    #[test]
    fn test_lossy_operands_use_f64() {
        assert_eq!(eval("1e-30 * 1").value, Value::Float(1e-30));
        assert_eq!(eval("2 / 3.0").value, Value::Float(2.0 / 3.0));
        assert_eq!(eval("0.75 / 0.25").value, Value::Float(3.0));
    }

    #[test]
    fn test_overflow_promotes_to_float() {
        let result = eval("9223372036854775807 + 1").value;
        assert!(matches!(result, Value::Float(_)));
    }

    #[test]
    fn test_modulo_by_zero() {
        let result = eval("5 % 0");
        assert_eq!(result.value, Value::Null);
        assert_eq!(result.count(DiagnosticKind::ArithmeticFailure), 1);
    }
}
