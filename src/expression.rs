//! Expression evaluation.
//!
//! This module provides:
//! - Expression AST representation
//! - Numeric type escalation for operators
//! - Evaluation against a caller-supplied column scope
//! - An extension seam for constructs the evaluator does not implement

pub mod error;
pub mod escalation;
pub mod eval;
pub mod expr;
pub mod operator;
pub mod scope;

pub use error::{EvalError, EvalResult, Feature};
pub use escalation::{assert_numeric, escalate};
pub use eval::{evaluate_expression, evaluate_predicate, ExpressionEvaluator};
pub use expr::{ColumnRef, Expression, InTarget, Literal, Subquery, WhenClause};
pub use operator::{ArithOp, BinaryOperator, BoolOp, CmpOp};
pub use scope::{ConstantScope, RowScope, Scope};
