//! Expression evaluation implementation.

use crate::expression::escalation::escalate;
use crate::expression::operator::{ArithOp, BinaryOperator, BoolOp, CmpOp};
use crate::expression::{EvalError, EvalResult, Expression, Feature, Scope, WhenClause};
use crate::value::{Kind, Value};
use log::debug;
use regex::Regex;

/// Evaluator for expressions
pub struct ExpressionEvaluator<'a> {
    /// Supplies column values and handles unsupported constructs
    scope: &'a dyn Scope,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(scope: &'a dyn Scope) -> Self {
        Self { scope }
    }

    /// Evaluate an expression. `Ok(None)` is SQL NULL.
    pub fn evaluate(&self, expr: &Expression) -> EvalResult<Option<Value>> {
        match expr {
            Expression::Literal(lit) => Ok(Some(lit.value.clone())),

            Expression::Column(col) => self.scope.resolve(col),

            Expression::Binary { op, left, right } => match op {
                BinaryOperator::Add => self.arith(left, right, ArithOp::Add),
                BinaryOperator::Sub => self.arith(left, right, ArithOp::Sub),
                BinaryOperator::Mul => self.arith(left, right, ArithOp::Mul),
                BinaryOperator::Div => self.arith(left, right, ArithOp::Div),
                BinaryOperator::And => self.boolean(left, right, BoolOp::And),
                BinaryOperator::Or => self.boolean(left, right, BoolOp::Or),
                BinaryOperator::Eq => self.equality(left, right, false),
                BinaryOperator::Ne => self.equality(left, right, true),
                BinaryOperator::Gt => self.cmp(left, right, CmpOp::Gt),
                BinaryOperator::Ge => self.cmp(left, right, CmpOp::Ge),
                BinaryOperator::Lt => self.cmp(left, right, CmpOp::Lt),
                BinaryOperator::Le => self.cmp(left, right, CmpOp::Le),
                BinaryOperator::Concat => self.unsupported(Feature::Concat, expr),
                BinaryOperator::BitwiseAnd => self.unsupported(Feature::BitwiseAnd, expr),
                BinaryOperator::BitwiseOr => self.unsupported(Feature::BitwiseOr, expr),
                BinaryOperator::BitwiseXor => self.unsupported(Feature::BitwiseXor, expr),
                BinaryOperator::Matches => self.unsupported(Feature::Matches, expr),
            },

            Expression::Case {
                operand,
                when_clauses,
                else_result,
            } => self.evaluate_case(operand.as_deref(), when_clauses, else_result.as_deref()),

            Expression::Between {
                expr: value,
                low,
                high,
            } => self.evaluate_between(value, low, high),

            Expression::Like {
                expr: value,
                pattern,
            } => self.evaluate_like(value, pattern),

            Expression::FunctionCall { name, args } => self.evaluate_function(name, args, expr),

            Expression::In { .. } => self.unsupported(Feature::In, expr),
            Expression::Exists { .. } => self.unsupported(Feature::Exists, expr),
            Expression::AllComparison { .. } => self.unsupported(Feature::AllComparison, expr),
            Expression::AnyComparison { .. } => self.unsupported(Feature::AnyComparison, expr),
            Expression::Negate(_) => self.unsupported(Feature::UnaryNegate, expr),
            Expression::IsNull { .. } => self.unsupported(Feature::IsNull, expr),
            Expression::Parameter => self.unsupported(Feature::BoundParameter, expr),
            Expression::Null => self.unsupported(Feature::NullLiteral, expr),
        }
    }

    /// Arithmetic on two escalated operands; NULL on either side yields NULL
    pub fn arith(
        &self,
        left: &Expression,
        right: &Expression,
        op: ArithOp,
    ) -> EvalResult<Option<Value>> {
        let (lhs, rhs) = match self.evaluate_pair(left, right)? {
            Some(pair) => pair,
            None => return Ok(None),
        };

        match escalate(lhs.kind(), rhs.kind())? {
            Kind::Double => Ok(Some(Value::Float(
                op.apply_double(lhs.as_float()?, rhs.as_float()?),
            ))),
            Kind::Long => Ok(Some(Value::Integer(
                op.apply_long(lhs.as_integer()?, rhs.as_integer()?)?,
            ))),
            Kind::Date => Err(EvalError::TypeError {
                message: format!("Arithmetic on dates ({})", op.as_str()),
            }),
            other => Err(invalid_escalation(other)),
        }
    }

    /// Ordering comparison; dates compare as `year * 10000 + month * 100 + day`
    pub fn cmp(
        &self,
        left: &Expression,
        right: &Expression,
        op: CmpOp,
    ) -> EvalResult<Option<Value>> {
        let (lhs, rhs) = match self.evaluate_pair(left, right)? {
            Some(pair) => pair,
            None => return Ok(None),
        };

        let result = match escalate(lhs.kind(), rhs.kind())? {
            Kind::Double => op.apply(lhs.as_float()?, rhs.as_float()?),
            Kind::Long => op.apply(lhs.as_integer()?, rhs.as_integer()?),
            Kind::Date => match (&lhs, &rhs) {
                (Value::Date(a), Value::Date(b)) => {
                    op.apply(Value::date_ordinal(a), Value::date_ordinal(b))
                }
                _ => return Err(invalid_escalation(Kind::Date)),
            },
            other => return Err(invalid_escalation(other)),
        };
        Ok(Some(Value::Boolean(result)))
    }

    /// AND / OR over two Boolean operands
    pub fn boolean(
        &self,
        left: &Expression,
        right: &Expression,
        op: BoolOp,
    ) -> EvalResult<Option<Value>> {
        let lhs = self.evaluate(left)?;
        let rhs = self.evaluate(right)?;
        combine_bool(lhs, rhs, op)
    }

    /// `=` / `<>` by tag-aware value equality, without escalation
    fn equality(
        &self,
        left: &Expression,
        right: &Expression,
        negated: bool,
    ) -> EvalResult<Option<Value>> {
        Ok(self
            .evaluate_pair(left, right)?
            .map(|(lhs, rhs)| Value::Boolean((lhs == rhs) != negated)))
    }

    /// `x BETWEEN lo AND hi` is `x >= lo AND x < hi`; the upper bound is exclusive
    fn evaluate_between(
        &self,
        value: &Expression,
        low: &Expression,
        high: &Expression,
    ) -> EvalResult<Option<Value>> {
        let lower = self.cmp(value, low, CmpOp::Ge)?;
        let upper = self.cmp(value, high, CmpOp::Lt)?;
        combine_bool(lower, upper, BoolOp::And)
    }

    fn evaluate_case(
        &self,
        operand: Option<&Expression>,
        when_clauses: &[WhenClause],
        else_result: Option<&Expression>,
    ) -> EvalResult<Option<Value>> {
        match operand {
            None => {
                for clause in when_clauses {
                    if guard(self.evaluate(&clause.when)?)? {
                        return self.evaluate(&clause.then);
                    }
                }
            }
            Some(operand) => {
                let switch = self.evaluate(operand)?;
                for clause in when_clauses {
                    let candidate = self.evaluate(&clause.when)?;
                    // NULL never matches, not even another NULL
                    if let (Some(switch), Some(candidate)) = (&switch, &candidate) {
                        if switch == candidate {
                            return self.evaluate(&clause.then);
                        }
                    }
                }
            }
        }

        match else_result {
            Some(else_result) => self.evaluate(else_result),
            None => Err(EvalError::UnhandledCase),
        }
    }

    /// Only `%` is a wildcard; the rest of the pattern is used as a regex as-is.
    fn evaluate_like(
        &self,
        value: &Expression,
        pattern: &Expression,
    ) -> EvalResult<Option<Value>> {
        let pattern = self.evaluate(pattern)?;
        let value = self.evaluate(value)?;
        let (pattern, value) = match (pattern, value) {
            (Some(pattern), Some(value)) => (pattern.as_text(), value.as_text()),
            _ => return Ok(None),
        };

        let regex = Regex::new(&format!("^(?:{})$", pattern.replace('%', ".*"))).map_err(
            |e| EvalError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            },
        )?;
        Ok(Some(Value::Boolean(regex.is_match(&value))))
    }

    fn evaluate_function(
        &self,
        name: &str,
        args: &[Expression],
        expr: &Expression,
    ) -> EvalResult<Option<Value>> {
        let name = name.to_uppercase();
        if name != "DATE" {
            return self.unsupported(Feature::Function(name), expr);
        }

        match args {
            [arg] => match self.evaluate(arg)? {
                Some(value) => Value::parse_date(&value.as_text()).map(Some),
                None => Ok(None),
            },
            _ => Err(EvalError::ArityError {
                function: name,
                expected: 1,
                actual: args.len(),
            }),
        }
    }

    fn unsupported(&self, feature: Feature, expr: &Expression) -> EvalResult<Option<Value>> {
        debug!("deferring {} to scope", feature);
        self.scope.evaluate_unsupported(feature, expr, self)
    }

    /// Evaluate both sides; `None` if either is NULL
    fn evaluate_pair(
        &self,
        left: &Expression,
        right: &Expression,
    ) -> EvalResult<Option<(Value, Value)>> {
        let lhs = self.evaluate(left)?;
        let rhs = self.evaluate(right)?;
        Ok(lhs.zip(rhs))
    }
}

/// Non-Boolean operands are an error even when the other side is NULL
fn combine_bool(
    lhs: Option<Value>,
    rhs: Option<Value>,
    op: BoolOp,
) -> EvalResult<Option<Value>> {
    let lhs = lhs.map(|v| v.as_bool()).transpose()?;
    let rhs = rhs.map(|v| v.as_bool()).transpose()?;
    Ok(lhs
        .zip(rhs)
        .map(|(a, b)| Value::Boolean(op.apply(a, b))))
}

/// A CASE guard must be a definite Boolean
fn guard(value: Option<Value>) -> EvalResult<bool> {
    match value {
        Some(value) => value.as_bool(),
        None => Err(EvalError::TypeError {
            message: "Invalid cast: found NULL, but expected BOOL".to_string(),
        }),
    }
}

fn invalid_escalation(kind: Kind) -> EvalError {
    EvalError::TypeError {
        message: format!("Invalid type escalation to {}", kind),
    }
}

/// Helper function to evaluate an expression in a scope
pub fn evaluate_expression(expr: &Expression, scope: &dyn Scope) -> EvalResult<Option<Value>> {
    ExpressionEvaluator::new(scope).evaluate(expr)
}

/// Evaluate an expression as a filter predicate. NULL counts as false.
pub fn evaluate_predicate(expr: &Expression, scope: &dyn Scope) -> EvalResult<bool> {
    match evaluate_expression(expr, scope)? {
        Some(value) => value.as_bool(),
        None => Ok(false),
    }
}
