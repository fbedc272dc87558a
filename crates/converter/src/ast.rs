//! Defines the raw template as it is written by a caller or read from a
//! configuration file. This is the **input** representation; the compiler
//! turns it into a [`crate::CompiledTemplate`].

use crate::error::ConverterError;
use crate::function::{FunctionRef, FunctionRegistry};
use serde_json::{Map, Value};

/// The key marking a computed-value descriptor in JSON templates.
pub const CALL_KEY: &str = "$call";
/// The key holding the argument list of a JSON computed-value descriptor.
pub const ARGS_KEY: &str = "args";

#[derive(Debug, Clone, PartialEq)]
pub enum RawTemplate {
    /// Any JSON value. Strings starting with `$` are path expressions;
    /// objects and arrays are walked recursively.
    Value(Value),
    /// An object whose values are themselves raw templates. Keys are unique.
    Object(Vec<(String, RawTemplate)>),
    /// An array of raw templates.
    Array(Vec<RawTemplate>),
    /// A bare function reference, called with no arguments.
    Function(FunctionRef),
    /// A fixed grouping. With a function first and at least one more
    /// element, it is a computed-value descriptor.
    Group(Vec<RawTemplate>),
}

impl RawTemplate {
    /// Builds an object template. A repeated key replaces the earlier value in place.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawTemplate)>,
    {
        let mut out: Vec<(String, RawTemplate)> = Vec::new();
        for (key, value) in entries {
            let key = key.into();
            match out.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }
        RawTemplate::Object(out)
    }

    pub fn array<I: IntoIterator<Item = RawTemplate>>(items: I) -> Self {
        RawTemplate::Array(items.into_iter().collect())
    }

    /// A computed value: `function` applied to `args`. Without arguments
    /// this is a bare function reference.
    pub fn call<I: IntoIterator<Item = RawTemplate>>(function: FunctionRef, args: I) -> Self {
        let args: Vec<RawTemplate> = args.into_iter().collect();
        if args.is_empty() {
            return RawTemplate::Function(function);
        }
        let mut items = Vec::with_capacity(args.len() + 1);
        items.push(RawTemplate::Function(function));
        items.extend(args);
        RawTemplate::Group(items)
    }

    /// Reads a template from JSON, resolving `{"$call": name, "args": [...]}`
    /// descriptors against `functions`.
    pub fn from_json(value: &Value, functions: &FunctionRegistry) -> Result<Self, ConverterError> {
        match value {
            Value::Object(map) if map.contains_key(CALL_KEY) => call_from_json(map, functions),
            Value::Object(map) => {
                let entries = map
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), RawTemplate::from_json(v, functions)?)))
                    .collect::<Result<Vec<_>, ConverterError>>()?;
                Ok(RawTemplate::Object(entries))
            }
            Value::Array(items) => {
                let items = items
                    .iter()
                    .map(|v| RawTemplate::from_json(v, functions))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawTemplate::Array(items))
            }
            scalar => Ok(RawTemplate::Value(scalar.clone())),
        }
    }
}

fn call_from_json(
    map: &Map<String, Value>,
    functions: &FunctionRegistry,
) -> Result<RawTemplate, ConverterError> {
    if let Some(extra) = map.keys().find(|k| *k != CALL_KEY && *k != ARGS_KEY) {
        return Err(ConverterError::InvalidTemplate(format!(
            "unexpected key '{}' in computed value descriptor",
            extra
        )));
    }
    let name = map
        .get(CALL_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| ConverterError::InvalidTemplate(format!("'{}' must name a function", CALL_KEY)))?;
    let function = functions
        .get(name)
        .cloned()
        .ok_or_else(|| ConverterError::UnknownFunction(name.to_string()))?;
    let args = match map.get(ARGS_KEY) {
        None => Vec::new(),
        Some(Value::Array(args)) => args
            .iter()
            .map(|v| RawTemplate::from_json(v, functions))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ConverterError::InvalidTemplate(format!(
                "'{}' of '{}' must be an array",
                ARGS_KEY, name
            )));
        }
    };
    Ok(RawTemplate::call(function, args))
}

impl From<Value> for RawTemplate {
    fn from(value: Value) -> Self {
        RawTemplate::Value(value)
    }
}

impl From<&str> for RawTemplate {
    fn from(value: &str) -> Self {
        RawTemplate::Value(Value::String(value.to_string()))
    }
}

impl From<String> for RawTemplate {
    fn from(value: String) -> Self {
        RawTemplate::Value(Value::String(value))
    }
}

impl From<FunctionRef> for RawTemplate {
    fn from(function: FunctionRef) -> Self {
        RawTemplate::Function(function)
    }
}
