//! Runtime values produced by expression evaluation.

use crate::expression::{EvalError, EvalResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

/// Value kinds, one per `Value` variant. Used only for escalation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Long,
    Double,
    String,
    Bool,
    Date,
    Timestamp,
    Time,
}

impl Kind {
    /// Check if this kind is one of the numeric kinds
    pub fn is_numeric(&self) -> bool {
        matches!(self, Kind::Long | Kind::Double)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Long => "LONG",
            Kind::Double => "DOUBLE",
            Kind::String => "STRING",
            Kind::Bool => "BOOL",
            Kind::Date => "DATE",
            Kind::Timestamp => "TIMESTAMP",
            Kind::Time => "TIME",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a SQL column type name into the kind its values take.
impl FromStr for Kind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "VARCHAR" | "CHAR" | "STRING" => Ok(Kind::String),
            "LONG" | "INTEGER" | "INT" => Ok(Kind::Long),
            "DOUBLE" | "FLOAT" | "DECIMAL" => Ok(Kind::Double),
            "BOOL" => Ok(Kind::Bool),
            "DATE" => Ok(Kind::Date),
            "TIME" | "DATETIME" => Ok(Kind::Time),
            "TIMESTAMP" => Ok(Kind::Timestamp),
            other => Err(EvalError::TypeError {
                message: format!("Unknown type: '{}'", other),
            }),
        }
    }
}

/// A fully evaluated expression result.
///
/// SQL NULL is not a variant: absence is `Option::<Value>::None`.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Time(NaiveTime),
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

impl Value {
    /// Parse an integer literal. A single leading `+` is accepted.
    pub fn parse_integer(text: &str) -> EvalResult<Value> {
        let digits = text.strip_prefix('+').unwrap_or(text);
        digits
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid_leaf("integer", text))
    }

    pub fn parse_float(text: &str) -> EvalResult<Value> {
        text.trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| invalid_leaf("float", text))
    }

    /// Parse undelimited `YYYY-MM-DD` text into a date.
    pub fn parse_date(text: &str) -> EvalResult<Value> {
        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| invalid_leaf("date", text))
    }

    /// Parse a delimited date literal such as `'2020-01-01'`.
    pub fn parse_date_literal(text: &str) -> EvalResult<Value> {
        Self::parse_date(strip_delimiters(text)?)
    }

    pub fn parse_timestamp_literal(text: &str) -> EvalResult<Value> {
        let inner = strip_delimiters(text)?.trim();
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(inner, format).ok())
            .map(Value::Timestamp)
            .ok_or_else(|| invalid_leaf("timestamp", text))
    }

    pub fn parse_time_literal(text: &str) -> EvalResult<Value> {
        let inner = strip_delimiters(text)?.trim();
        NaiveTime::parse_from_str(inner, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(inner, "%H:%M:%S%.f"))
            .map(Value::Time)
            .map_err(|_| invalid_leaf("time", text))
    }

    /// Get the kind of this value
    pub fn kind(&self) -> Kind {
        match self {
            Value::Integer(_) => Kind::Long,
            Value::Float(_) => Kind::Double,
            Value::Text(_) => Kind::String,
            Value::Boolean(_) => Kind::Bool,
            Value::Date(_) => Kind::Date,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::Time(_) => Kind::Time,
        }
    }

    /// Widen to an integer. Floats truncate toward zero.
    pub fn as_integer(&self) -> EvalResult<i64> {
        match self {
            Value::Integer(i) => Ok(*i),
            Value::Float(f) => Ok(*f as i64),
            other => Err(invalid_leaf("integer", &other.to_string())),
        }
    }

    pub fn as_float(&self) -> EvalResult<f64> {
        match self {
            Value::Integer(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            other => Err(invalid_leaf("float", &other.to_string())),
        }
    }

    pub fn as_bool(&self) -> EvalResult<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(EvalError::TypeError {
                message: format!("Invalid cast: found {}, but expected BOOL", other.kind()),
            }),
        }
    }

    /// Text contents for string operations. Non-text values use their display form.
    pub fn as_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Orderable encoding of a date: `year * 10000 + month * 100 + day`.
    pub fn date_ordinal(date: &NaiveDate) -> i64 {
        date.year() as i64 * 10000 + date.month() as i64 * 100 + date.day() as i64
    }
}

/// Integers and floats compare by widened value; other kinds only match their own kind.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            // Debug keeps the fractional part: 514.0 rather than 514
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Text(s) => write!(f, "'{}'", s),
            Value::Boolean(true) => f.write_str("TRUE"),
            Value::Boolean(false) => f.write_str("FALSE"),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
        }
    }
}

fn strip_delimiters(text: &str) -> EvalResult<&str> {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(_), Some(_)) => Ok(chars.as_str()),
        _ => Err(invalid_leaf("delimited literal", text)),
    }
}

fn invalid_leaf(expected: &str, text: &str) -> EvalError {
    EvalError::InvalidLeaf {
        message: format!("cannot read {} from '{}'", expected, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_strips_plus() {
        assert_eq!(Value::parse_integer("+42").unwrap(), Value::Integer(42));
        assert_eq!(Value::parse_integer("-7").unwrap(), Value::Integer(-7));
        assert!(matches!(
            Value::parse_integer("4x"),
            Err(EvalError::InvalidLeaf { .. })
        ));
        assert!(Value::parse_integer("").is_err());
    }

    #[test]
    fn test_date_literals() {
        let date = Value::parse_date_literal("'2020-01-31'").unwrap();
        assert_eq!(
            date,
            Value::Date(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap())
        );
        assert_eq!(date.to_string(), "2020-01-31");

        assert!(Value::parse_date_literal("'2020-02-30'").is_err());
        assert!(Value::parse_date_literal("'").is_err());
        assert!(Value::parse_date("2020-13-01").is_err());
    }

    #[test]
    fn test_timestamp_and_time_literals() {
        let ts = Value::parse_timestamp_literal("'2021-06-01 12:30:00'").unwrap();
        assert_eq!(ts.kind(), Kind::Timestamp);
        assert_eq!(ts.to_string(), "2021-06-01 12:30:00");

        // Fractional seconds survive display
        let ts = Value::parse_timestamp_literal("'2021-06-01 12:30:00.5'").unwrap();
        assert_eq!(ts.to_string(), "2021-06-01 12:30:00.500");

        let t = Value::parse_time_literal("'08:15:00'").unwrap();
        assert_eq!(t.kind(), Kind::Time);
        assert_eq!(t.to_string(), "08:15:00");

        assert!(Value::parse_time_literal("'25:00:00'").is_err());
    }

    #[test]
    fn test_numeric_widening() {
        assert_eq!(Value::Integer(3).as_float().unwrap(), 3.0);
        assert_eq!(Value::Float(3.9).as_integer().unwrap(), 3);
        assert_eq!(Value::Float(-3.9).as_integer().unwrap(), -3);

        assert!(matches!(
            Value::Text("3".to_string()).as_integer(),
            Err(EvalError::InvalidLeaf { .. })
        ));
        assert!(matches!(
            Value::Boolean(true).as_float(),
            Err(EvalError::InvalidLeaf { .. })
        ));
    }

    #[test]
    fn test_tag_aware_equality() {
        assert_eq!(Value::Integer(2), Value::Float(2.0));
        assert_eq!(Value::Float(2.0), Value::Integer(2));
        assert_ne!(Value::Integer(2), Value::Float(2.5));
        assert_ne!(Value::Text("TRUE".to_string()), Value::Boolean(true));
        assert_ne!(Value::Integer(1), Value::Boolean(true));
        assert_ne!(Value::Text("1".to_string()), Value::Integer(1));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(514).to_string(), "514");
        assert_eq!(Value::Float(514.0).to_string(), "514.0");
        assert_eq!(Value::Float(10.0 / 3.0).to_string(), "3.3333333333333335");
        assert_eq!(Value::Text("abc".to_string()).to_string(), "'abc'");
        assert_eq!(Value::Boolean(false).to_string(), "FALSE");
    }

    #[test]
    fn test_as_text() {
        assert_eq!(Value::Text("abc".to_string()).as_text(), "abc");
        assert_eq!(Value::Integer(12).as_text(), "12");
    }

    #[test]
    fn test_date_ordinal() {
        let d = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(Value::date_ordinal(&d), 19991231);
    }

    #[test]
    fn test_kind_from_type_name() {
        assert_eq!("varchar".parse::<Kind>().unwrap(), Kind::String);
        assert_eq!("INT".parse::<Kind>().unwrap(), Kind::Long);
        assert_eq!("Decimal".parse::<Kind>().unwrap(), Kind::Double);
        assert_eq!("DATETIME".parse::<Kind>().unwrap(), Kind::Time);
        assert_eq!("timestamp".parse::<Kind>().unwrap(), Kind::Timestamp);
        assert!("BLOB".parse::<Kind>().is_err());
    }
}
