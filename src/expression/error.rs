//! Error types for expression evaluation.

use std::fmt;
use thiserror::Error;

/// Constructs the evaluator recognises but does not evaluate itself.
///
/// A [`Scope`](crate::expression::Scope) may take these over through
/// `evaluate_unsupported`; otherwise they surface as
/// [`EvalError::UnsupportedFeature`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Feature {
    AllComparison,
    AnyComparison,
    Exists,
    In,
    Matches,
    BitwiseXor,
    BitwiseOr,
    BitwiseAnd,
    Concat,
    /// A function other than the built-in `DATE`, by upper-cased name
    Function(String),
    UnaryNegate,
    IsNull,
    BoundParameter,
    NullLiteral,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::AllComparison => f.write_str("AllComparison"),
            Feature::AnyComparison => f.write_str("AnyComparison"),
            Feature::Exists => f.write_str("Exists"),
            Feature::In => f.write_str("In"),
            Feature::Matches => f.write_str("Matches"),
            Feature::BitwiseXor => f.write_str("BitwiseXor"),
            Feature::BitwiseOr => f.write_str("BitwiseOr"),
            Feature::BitwiseAnd => f.write_str("BitwiseAnd"),
            Feature::Concat => f.write_str("Concat"),
            Feature::Function(name) => write!(f, "Function:{}", name),
            Feature::UnaryNegate => f.write_str("UnaryNegate"),
            Feature::IsNull => f.write_str("IsNull"),
            Feature::BoundParameter => f.write_str("BoundParameter"),
            Feature::NullLiteral => f.write_str("NullLiteral"),
        }
    }
}

/// Errors that can occur during expression evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Operand kind incompatible with the operator
    #[error("Typecheck Error: {message}")]
    TypeError { message: String },

    /// Literal text that cannot be read as the form an operation needs
    #[error("Invalid leaf value: {message}")]
    InvalidLeaf { message: String },

    #[error("Incomplete expression support ({0})")]
    UnsupportedFeature(Feature),

    /// The scope cannot resolve a column reference
    #[error("Scope error: {0}")]
    ScopeError(String),

    #[error("{function}() takes exactly {expected} argument(s), got {actual}")]
    ArityError {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// CASE with no matching WHEN and no ELSE
    #[error("Unhandled CASE statement")]
    UnhandledCase,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid LIKE pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl EvalError {
    /// The unsupported construct, if this error is an unsupported-feature signal
    pub fn unsupported_feature(&self) -> Option<&Feature> {
        match self {
            EvalError::UnsupportedFeature(feature) => Some(feature),
            _ => None,
        }
    }
}

/// Result type for expression operations
pub type EvalResult<T> = Result<T, EvalError>;
