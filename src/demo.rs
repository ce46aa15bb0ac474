//! Library side of the `vibeeval` command: read SQL expressions from files or
//! standard input, evaluate them against a row scope, format the results.

use crate::expression::{evaluate_expression, ConstantScope, Expression, RowScope};
use crate::sql::parse_expression;
use crate::value::Value;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where one expression is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// Map command-line paths to sources; no paths or `-` means standard input
    pub fn from_paths(paths: &[PathBuf]) -> Vec<Source> {
        if paths.is_empty() {
            return vec![Source::Stdin];
        }
        paths
            .iter()
            .map(|path| {
                if path.as_os_str() == "-" {
                    Source::Stdin
                } else {
                    Source::File(path.clone())
                }
            })
            .collect()
    }

    /// Read the whole input
    pub fn read(&self) -> Result<String> {
        debug!("reading expression from {}", self);
        match self {
            Source::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read standard input")?;
                Ok(text)
            }
            Source::File(path) => read_file(path),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => f.write_str("<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse a `NAME=EXPR` binding. EXPR must not reference columns; it is
/// evaluated once, here. A bare `NULL` binds the column to NULL.
pub fn parse_binding(arg: &str) -> Result<(String, Option<Value>)> {
    let (name, sql) = match arg.split_once('=') {
        Some(parts) => parts,
        None => bail!("Invalid binding '{}': expected NAME=EXPR", arg),
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid binding '{}': empty column name", arg);
    }

    let expr = parse_expression(sql).with_context(|| format!("Invalid binding for {}", name))?;
    if !expr.is_constant() {
        bail!("Binding for {} must be a constant expression", name);
    }
    let value = match expr {
        Expression::Null => None,
        expr => evaluate_expression(&expr, &ConstantScope::zero())
            .with_context(|| format!("Failed to evaluate binding for {}", name))?,
    };

    debug!("bound {} to {:?}", name, value);
    Ok((name.to_string(), value))
}

/// Evaluates expression text against a fixed set of column bindings
#[derive(Debug, Clone)]
pub struct Runner {
    scope: RowScope,
}

impl Runner {
    /// Build a runner from `NAME=EXPR` bindings. Unbound columns evaluate to
    /// integer zero unless `strict` is set.
    pub fn new<I, S>(bindings: I, strict: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scope = if strict {
            RowScope::new()
        } else {
            RowScope::with_fallback(ConstantScope::zero())
        };
        for arg in bindings {
            let (name, value) = parse_binding(arg.as_ref())?;
            scope.bind(&name, value);
        }
        info!(
            "{} column binding(s), unbound columns {}",
            scope.len(),
            if strict { "rejected" } else { "read as 0" }
        );
        Ok(Self { scope })
    }

    pub fn evaluate(&self, sql: &str) -> Result<Option<Value>> {
        let expr = parse_expression(sql)?;
        debug!("parsed expression: {:?}", expr);
        Ok(evaluate_expression(&expr, &self.scope)?)
    }

    /// Evaluate and format for output
    pub fn run(&self, sql: &str) -> Result<String> {
        self.evaluate(sql).map(|value| format_result(value.as_ref()))
    }

    pub fn run_source(&self, source: &Source) -> Result<String> {
        let sql = source.read()?;
        self.run(&sql)
            .with_context(|| format!("Failed to evaluate {}", source))
    }
}

/// Display form of a result; `NULL` for no value
pub fn format_result(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "NULL".to_string(),
    }
}
