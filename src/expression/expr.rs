//! Expression AST definitions.

use crate::expression::operator::BinaryOperator;
use crate::expression::EvalResult;
use crate::value::Value;
use std::fmt;

/// Column reference in an expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Optional table or alias qualifier (`R` in `R.A`)
    pub table: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Literal value in an expression
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Integer literal from its source text, e.g. `+42`
    pub fn integer(text: &str) -> EvalResult<Self> {
        Value::parse_integer(text).map(Self::new)
    }

    pub fn float(text: &str) -> EvalResult<Self> {
        Value::parse_float(text).map(Self::new)
    }

    pub fn string(val: impl Into<String>) -> Self {
        Self::new(Value::Text(val.into()))
    }

    pub fn boolean(val: bool) -> Self {
        Self::new(Value::Boolean(val))
    }

    /// Date literal from its delimited source text, e.g. `'2020-01-01'`
    pub fn date(text: &str) -> EvalResult<Self> {
        Value::parse_date_literal(text).map(Self::new)
    }

    pub fn timestamp(text: &str) -> EvalResult<Self> {
        Value::parse_timestamp_literal(text).map(Self::new)
    }

    pub fn time(text: &str) -> EvalResult<Self> {
        Value::parse_time_literal(text).map(Self::new)
    }
}

/// A nested query. Carried as source text; the evaluator never runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subquery {
    pub sql: String,
}

impl Subquery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }
}

/// One `WHEN .. THEN ..` arm of a CASE expression
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub when: Expression,
    pub then: Expression,
}

/// Right-hand side of an IN expression
#[derive(Debug, Clone, PartialEq)]
pub enum InTarget {
    List(Vec<Expression>),
    Subquery(Subquery),
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),

    Column(ColumnRef),

    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Simple CASE when `operand` is set, searched CASE otherwise
    Case {
        operand: Option<Box<Expression>>,
        when_clauses: Vec<WhenClause>,
        else_result: Option<Box<Expression>>,
    },

    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },

    Like {
        expr: Box<Expression>,
        pattern: Box<Expression>,
    },

    In {
        expr: Box<Expression>,
        target: InTarget,
        negated: bool,
    },

    Exists {
        subquery: Subquery,
        negated: bool,
    },

    /// `x op ALL (SELECT ...)`
    AllComparison {
        op: BinaryOperator,
        expr: Box<Expression>,
        subquery: Subquery,
    },

    /// `x op ANY (SELECT ...)`
    AnyComparison {
        op: BinaryOperator,
        expr: Box<Expression>,
        subquery: Subquery,
    },

    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },

    /// Unary minus
    Negate(Box<Expression>),

    IsNull {
        expr: Box<Expression>,
        negated: bool,
    },

    /// Bound parameter placeholder (`?`)
    Parameter,

    Null,
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: Value) -> Self {
        Expression::Literal(Literal::new(value))
    }

    pub fn integer(val: i64) -> Self {
        Self::literal(Value::Integer(val))
    }

    pub fn float(val: f64) -> Self {
        Self::literal(Value::Float(val))
    }

    pub fn string(val: impl Into<String>) -> Self {
        Self::literal(Value::Text(val.into()))
    }

    pub fn boolean(val: bool) -> Self {
        Self::literal(Value::Boolean(val))
    }

    /// Create a column reference expression
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(ColumnRef::new(name))
    }

    /// Create a qualified column reference (table.column)
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column(ColumnRef::qualified(table, name))
    }

    /// Create a binary operation expression
    pub fn binary_op(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Or, left, right)
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Eq, left, right)
    }

    pub fn ne(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ne, left, right)
    }

    pub fn lt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Lt, left, right)
    }

    pub fn le(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Le, left, right)
    }

    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Gt, left, right)
    }

    pub fn ge(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ge, left, right)
    }

    pub fn add_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Add, left, right)
    }

    pub fn sub_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Sub, left, right)
    }

    pub fn mul_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Mul, left, right)
    }

    pub fn div_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Div, left, right)
    }

    pub fn between(expr: Expression, low: Expression, high: Expression) -> Self {
        Expression::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
        }
    }

    pub fn like(expr: Expression, pattern: Expression) -> Self {
        Expression::Like {
            expr: Box::new(expr),
            pattern: Box::new(pattern),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Searched CASE: `CASE WHEN c1 THEN r1 ... [ELSE e] END`
    pub fn searched_case(
        arms: Vec<(Expression, Expression)>,
        else_result: Option<Expression>,
    ) -> Self {
        Self::case(None, arms, else_result)
    }

    /// Simple CASE: `CASE x WHEN v1 THEN r1 ... [ELSE e] END`
    pub fn simple_case(
        operand: Expression,
        arms: Vec<(Expression, Expression)>,
        else_result: Option<Expression>,
    ) -> Self {
        Self::case(Some(operand), arms, else_result)
    }

    fn case(
        operand: Option<Expression>,
        arms: Vec<(Expression, Expression)>,
        else_result: Option<Expression>,
    ) -> Self {
        Expression::Case {
            operand: operand.map(Box::new),
            when_clauses: arms
                .into_iter()
                .map(|(when, then)| WhenClause { when, then })
                .collect(),
            else_result: else_result.map(Box::new),
        }
    }

    /// Check if this expression is a constant (contains no column references)
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal(_) | Expression::Null | Expression::Parameter => true,
            Expression::Column(_) => false,
            Expression::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
            Expression::Case {
                operand,
                when_clauses,
                else_result,
            } => {
                operand.as_ref().map_or(true, |e| e.is_constant())
                    && when_clauses
                        .iter()
                        .all(|w| w.when.is_constant() && w.then.is_constant())
                    && else_result.as_ref().map_or(true, |e| e.is_constant())
            }
            Expression::Between { expr, low, high } => {
                expr.is_constant() && low.is_constant() && high.is_constant()
            }
            Expression::Like { expr, pattern } => expr.is_constant() && pattern.is_constant(),
            Expression::In { expr, target, .. } => {
                expr.is_constant()
                    && match target {
                        InTarget::List(list) => list.iter().all(|e| e.is_constant()),
                        // A subquery may be correlated with the outer row
                        InTarget::Subquery(_) => false,
                    }
            }
            Expression::Exists { .. }
            | Expression::AllComparison { .. }
            | Expression::AnyComparison { .. } => false,
            Expression::FunctionCall { args, .. } => args.iter().all(|a| a.is_constant()),
            Expression::Negate(operand) => operand.is_constant(),
            Expression::IsNull { expr, .. } => expr.is_constant(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref() {
        let col = ColumnRef::new("A");
        assert!(col.table.is_none());
        assert_eq!(col.to_string(), "A");

        let col = ColumnRef::qualified("R", "A");
        assert_eq!(col.table.as_deref(), Some("R"));
        assert_eq!(col.to_string(), "R.A");
    }

    #[test]
    fn test_literal_constructors() {
        assert_eq!(Literal::integer("+5").unwrap().value, Value::Integer(5));
        assert_eq!(Literal::float("2.5").unwrap().value, Value::Float(2.5));
        assert_eq!(
            Literal::string("hello").value,
            Value::Text("hello".to_string())
        );
        assert_eq!(Literal::boolean(true).value, Value::Boolean(true));
        assert!(Literal::date("'2020-01-01'").is_ok());
        assert!(Literal::date("2020-01-01").is_err());
        assert!(Literal::timestamp("'2020-01-01 00:00:00'").is_ok());
        assert!(Literal::time("'12:00:00'").is_ok());
    }

    #[test]
    fn test_expression_builders() {
        let expr = Expression::add_expr(Expression::column("A"), Expression::integer(5));
        assert!(matches!(
            expr,
            Expression::Binary {
                op: BinaryOperator::Add,
                ..
            }
        ));

        let expr = Expression::simple_case(
            Expression::column("A"),
            vec![(Expression::integer(1), Expression::string("one"))],
            None,
        );
        match expr {
            Expression::Case {
                operand: Some(_),
                when_clauses,
                else_result: None,
            } => assert_eq!(when_clauses.len(), 1),
            other => panic!("Expected simple CASE, got {:?}", other),
        }
    }

    #[test]
    fn test_case_builders_share_arms() {
        let arms = || vec![(Expression::integer(1), Expression::string("one"))];

        let simple = Expression::simple_case(Expression::column("A"), arms(), None);
        let searched = Expression::searched_case(arms(), Some(Expression::string("z")));
        match (simple, searched) {
            (
                Expression::Case {
                    operand: Some(operand),
                    when_clauses: simple_arms,
                    else_result: None,
                },
                Expression::Case {
                    operand: None,
                    when_clauses: searched_arms,
                    else_result: Some(else_result),
                },
            ) => {
                assert_eq!(*operand, Expression::column("A"));
                assert_eq!(simple_arms, searched_arms);
                assert_eq!(*else_result, Expression::string("z"));
            }
            other => panic!("Expected two CASE expressions, got {:?}", other),
        }
    }

    #[test]
    fn test_is_constant() {
        assert!(Expression::integer(42).is_constant());
        assert!(!Expression::column("A").is_constant());
        assert!(Expression::add_expr(Expression::integer(1), Expression::integer(2)).is_constant());
        assert!(
            !Expression::add_expr(Expression::column("A"), Expression::integer(2)).is_constant()
        );
        let date = Expression::function("DATE", vec![Expression::string("2020-01-01")]);
        assert!(date.is_constant());
        assert!(!Expression::Exists {
            subquery: Subquery::new("SELECT 1"),
            negated: false,
        }
        .is_constant());
        assert!(!Expression::searched_case(
            vec![(Expression::boolean(true), Expression::column("B"))],
            None
        )
        .is_constant());
    }
}
