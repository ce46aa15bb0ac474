//! Column binding for expression evaluation.
//!
//! A [`Scope`] supplies the value of every column reference the evaluator
//! reaches, and may take over constructs the evaluator does not implement.

use crate::expression::{
    ColumnRef, EvalError, EvalResult, Expression, ExpressionEvaluator, Feature,
};
use crate::value::Value;
use log::trace;
use std::collections::HashMap;

/// Row context an expression is evaluated in
pub trait Scope {
    /// Resolve a column for the current row. `Ok(None)` is SQL NULL.
    ///
    /// Called once per column reference occurrence; results are not cached.
    fn resolve(&self, column: &ColumnRef) -> EvalResult<Option<Value>>;

    /// Evaluate a construct the evaluator does not handle itself.
    ///
    /// Override this to add subquery-aware evaluation for `IN`, `EXISTS`,
    /// `ALL` and `ANY`, or any other [`Feature`]. `evaluator` can be used to
    /// evaluate child expressions in the same scope.
    fn evaluate_unsupported(
        &self,
        feature: Feature,
        _expr: &Expression,
        _evaluator: &ExpressionEvaluator<'_>,
    ) -> EvalResult<Option<Value>> {
        Err(EvalError::UnsupportedFeature(feature))
    }
}

impl<F> Scope for F
where
    F: Fn(&ColumnRef) -> EvalResult<Option<Value>>,
{
    fn resolve(&self, column: &ColumnRef) -> EvalResult<Option<Value>> {
        self(column)
    }
}

/// Binds every column to the same value
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantScope {
    value: Option<Value>,
}

impl ConstantScope {
    pub fn new(value: Option<Value>) -> Self {
        Self { value }
    }

    /// Every column is integer zero
    pub fn zero() -> Self {
        Self::new(Some(Value::Integer(0)))
    }
}

impl Scope for ConstantScope {
    fn resolve(&self, column: &ColumnRef) -> EvalResult<Option<Value>> {
        trace!("resolving {} to constant {:?}", column, self.value);
        Ok(self.value.clone())
    }
}

/// Named column bindings for a single row.
///
/// Names compare case-insensitively. A qualified reference `T.C` matches a
/// binding for `T.C` first, then one for `C`.
#[derive(Debug, Clone, Default)]
pub struct RowScope {
    bindings: HashMap<String, Option<Value>>,
    fallback: Option<ConstantScope>,
}

impl RowScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve unbound columns through `fallback` instead of failing
    pub fn with_fallback(fallback: ConstantScope) -> Self {
        Self {
            bindings: HashMap::new(),
            fallback: Some(fallback),
        }
    }

    /// Bind a column (`"A"` or `"R.A"`) to a value, or to NULL with `None`
    pub fn bind(&mut self, name: &str, value: Option<Value>) -> &mut Self {
        self.bindings.insert(name.to_uppercase(), value);
        self
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.bind(name, Some(value));
        self
    }

    pub fn with_null(mut self, name: &str) -> Self {
        self.bind(name, None);
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn lookup(&self, column: &ColumnRef) -> Option<&Option<Value>> {
        let name = column.name.to_uppercase();
        column
            .table
            .as_ref()
            .and_then(|table| {
                self.bindings
                    .get(&format!("{}.{}", table.to_uppercase(), name))
            })
            .or_else(|| self.bindings.get(&name))
    }
}

impl Scope for RowScope {
    fn resolve(&self, column: &ColumnRef) -> EvalResult<Option<Value>> {
        if let Some(value) = self.lookup(column) {
            trace!("resolved {} to {:?}", column, value);
            return Ok(value.clone());
        }
        match &self.fallback {
            Some(fallback) => fallback.resolve(column),
            None => Err(EvalError::ScopeError(format!(
                "column {} is not in scope",
                column
            ))),
        }
    }
}
