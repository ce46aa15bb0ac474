//! Numeric type escalation for binary operators.

use crate::expression::{EvalError, EvalResult};
use crate::value::Kind;

/// Require a numeric kind
pub fn assert_numeric(found: Kind) -> EvalResult<Kind> {
    if found.is_numeric() {
        Ok(found)
    } else {
        Err(EvalError::TypeError {
            message: format!("Found {}, but expected a number", found),
        })
    }
}

/// Compute the kind both operands are coerced to before an operator applies.
///
/// Two dates escalate to `Date` (only comparison accepts that). Otherwise both
/// sides must be numeric and the result is `Double` if either side is.
pub fn escalate(left: Kind, right: Kind) -> EvalResult<Kind> {
    if left == Kind::Date && right == Kind::Date {
        return Ok(Kind::Date);
    }
    let left = assert_numeric(left)?;
    let right = assert_numeric(right)?;
    if left == Kind::Double || right == Kind::Double {
        Ok(Kind::Double)
    } else {
        Ok(Kind::Long)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_escalation() {
        assert_eq!(escalate(Kind::Long, Kind::Long).unwrap(), Kind::Long);
        assert_eq!(escalate(Kind::Long, Kind::Double).unwrap(), Kind::Double);
        assert_eq!(escalate(Kind::Double, Kind::Long).unwrap(), Kind::Double);
        assert_eq!(escalate(Kind::Double, Kind::Double).unwrap(), Kind::Double);
    }

    #[test]
    fn test_date_escalation() {
        assert_eq!(escalate(Kind::Date, Kind::Date).unwrap(), Kind::Date);
        assert!(matches!(
            escalate(Kind::Date, Kind::Long),
            Err(EvalError::TypeError { .. })
        ));
        assert!(matches!(
            escalate(Kind::Long, Kind::Date),
            Err(EvalError::TypeError { .. })
        ));
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = escalate(Kind::String, Kind::Bool).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Typecheck Error: Found STRING, but expected a number"
        );
        assert!(escalate(Kind::Timestamp, Kind::Timestamp).is_err());
        assert!(escalate(Kind::Long, Kind::Time).is_err());
    }

    #[test]
    fn test_escalation_is_symmetric() {
        let kinds = [
            Kind::Long,
            Kind::Double,
            Kind::String,
            Kind::Bool,
            Kind::Date,
            Kind::Timestamp,
            Kind::Time,
        ];
        for &a in &kinds {
            for &b in &kinds {
                assert_eq!(escalate(a, b).ok(), escalate(b, a).ok());
            }
        }
    }
}
