//! Implements the "Execution" phase: walks a compiled template against one
//! source document and builds the output value.

use crate::compiler::TemplateNode;
use crate::error::ConverterError;
use crate::function::FunctionRef;
use crate::resolver::{self, MatchPolicy};
use serde::Deserialize;
use serde_json::{Map, Value};

/// What to do with a node that has no defined conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownNodePolicy {
    /// The node converts to `null`.
    #[default]
    YieldNull,
    /// Conversion fails with `UnsupportedNode`.
    Reject,
}

/// Per-converter evaluation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub match_policy: MatchPolicy,
    pub unknown_nodes: UnknownNodePolicy,
}

/// The state of a single evaluation. The current template location is
/// tracked so that errors can say which node failed.
pub struct TemplateExecutor<'a> {
    document: &'a Value,
    options: ConvertOptions,
    location: Vec<String>,
}

impl<'a> TemplateExecutor<'a> {
    pub fn new(document: &'a Value, options: ConvertOptions) -> Self {
        Self {
            document,
            options,
            location: Vec::new(),
        }
    }

    /// Recursively converts `node` against the source document.
    pub fn evaluate(&mut self, node: &TemplateNode) -> Result<Value, ConverterError> {
        match node {
            TemplateNode::Literal(value) => Ok(value.clone()),
            TemplateNode::PathRef(expr) => {
                resolver::resolve_with(expr, self.document, self.options.match_policy)
                    .map_err(|e| e.at(&self.location()))
            }
            TemplateNode::Computed { function, args } => self.invoke(function, args),
            TemplateNode::Mapping(entries) => {
                let mut out = Map::with_capacity(entries.len());
                for (key, child) in entries {
                    self.location.push(key.clone());
                    let value = self.evaluate(child);
                    self.location.pop();
                    out.insert(key.clone(), value?);
                }
                Ok(Value::Object(out))
            }
            TemplateNode::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, child) in items.iter().enumerate() {
                    self.location.push(i.to_string());
                    let value = self.evaluate(child);
                    self.location.pop();
                    out.push(value?);
                }
                Ok(Value::Array(out))
            }
            TemplateNode::Unsupported { kind } => match self.options.unknown_nodes {
                UnknownNodePolicy::YieldNull => {
                    log::trace!("Unsupported node at {} converted to null", self.location());
                    Ok(Value::Null)
                }
                UnknownNodePolicy::Reject => Err(ConverterError::UnsupportedNode {
                    kind: kind.clone(),
                    location: self.location(),
                }),
            },
        }
    }

    /// Converts every argument in declared order, then calls `function` once.
    pub fn invoke(
        &mut self,
        function: &FunctionRef,
        args: &[TemplateNode],
    ) -> Result<Value, ConverterError> {
        let mut resolved = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            self.location.push(format!("{}({})", function.name(), i));
            let value = self.evaluate(arg);
            self.location.pop();
            resolved.push(value.map_err(|e| self.wrap(function, e))?);
        }
        function
            .call(resolved)
            .map_err(|e| self.wrap(function, e))
    }

    fn wrap<E>(&self, function: &FunctionRef, error: E) -> ConverterError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConverterError::ComputedValue {
            function: function.name().to_string(),
            location: self.location(),
            source: Box::new(error),
        }
    }

    fn location(&self) -> String {
        format!("/{}", self.location.join("/"))
    }
}

/// Converts a single node against `document`.
pub fn evaluate(
    node: &TemplateNode,
    document: &Value,
    options: ConvertOptions,
) -> Result<Value, ConverterError> {
    TemplateExecutor::new(document, options).evaluate(node)
}

/// Resolves `args` against `document` and calls `function` with the results.
pub fn invoke(
    function: &FunctionRef,
    args: &[TemplateNode],
    document: &Value,
    options: ConvertOptions,
) -> Result<Value, ConverterError> {
    TemplateExecutor::new(document, options).invoke(function, args)
}
