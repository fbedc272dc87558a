//! Resolves compiled path expressions against a source document.
use crate::error::ConverterError;
use idmef_jpath::{self as jpath, PathExpression};
use serde::Deserialize;
use serde_json::Value;

/// How a path that matches several nodes is turned into one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Use the first match in document order and ignore the rest.
    #[default]
    First,
    /// Fail with `AmbiguousPath` when more than one node matches.
    Unique,
    /// Return every match as an array.
    Collect,
}

/// Resolves `expr` with the default [`MatchPolicy::First`].
pub fn resolve(expr: &PathExpression, document: &Value) -> Result<Value, ConverterError> {
    resolve_with(expr, document, MatchPolicy::First)
}

/// Resolves `expr` against `document`. Zero matches is always an error.
pub fn resolve_with(
    expr: &PathExpression,
    document: &Value,
    policy: MatchPolicy,
) -> Result<Value, ConverterError> {
    let matches = jpath::select(expr, document);
    if matches.is_empty() {
        return Err(ConverterError::PathNotFound {
            path: expr.to_string(),
            location: "/".to_string(),
        });
    }
    match policy {
        MatchPolicy::First => Ok(matches[0].clone()),
        MatchPolicy::Unique if matches.len() > 1 => Err(ConverterError::AmbiguousPath {
            path: expr.to_string(),
            location: "/".to_string(),
            count: matches.len(),
        }),
        MatchPolicy::Unique => Ok(matches[0].clone()),
        MatchPolicy::Collect => Ok(Value::Array(matches.into_iter().cloned().collect())),
    }
}
