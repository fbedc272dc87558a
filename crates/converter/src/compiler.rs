//! Implements the "Compilation" phase.
//! It transforms a raw template into a validated, executable node tree.

use crate::ast::RawTemplate;
use crate::error::ConverterError;
use crate::function::{FunctionRef, FunctionRegistry};
use idmef_jpath::{self as jpath, PathExpression};
use serde_json::Value;

/// A pre-compiled, executable template node. This is the output of the `Compiler`.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    /// Copied to the output unchanged.
    Literal(Value),
    /// Resolved against the source document.
    PathRef(PathExpression),
    /// A function applied to converted argument templates.
    Computed {
        function: FunctionRef,
        args: Vec<TemplateNode>,
    },
    Mapping(Vec<(String, TemplateNode)>),
    Sequence(Vec<TemplateNode>),
    /// A raw node with no defined conversion, handled by the unknown-node policy.
    Unsupported { kind: String },
}

impl TemplateNode {
    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + match self {
            TemplateNode::Computed { args, .. } | TemplateNode::Sequence(args) => {
                args.iter().map(TemplateNode::node_count).sum()
            }
            TemplateNode::Mapping(entries) => entries.iter().map(|(_, n)| n.node_count()).sum(),
            _ => 0,
        }
    }
}

/// The immutable result of compiling a raw template. Safe to share across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    root: TemplateNode,
}

impl CompiledTemplate {
    pub fn root(&self) -> &TemplateNode {
        &self.root
    }
}

/// Compiles raw templates. Compilation only looks at the template; it never
/// sees a source document.
#[derive(Debug, Default, Clone, Copy)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(&self, template: &RawTemplate) -> Result<CompiledTemplate, ConverterError> {
        let root = self.compile_node(template)?;
        log::debug!("Compiled template with {} nodes", root.node_count());
        Ok(CompiledTemplate { root })
    }

    /// Compiles a JSON template whose computed values name functions in `functions`.
    pub fn compile_json(
        &self,
        template: &Value,
        functions: &FunctionRegistry,
    ) -> Result<CompiledTemplate, ConverterError> {
        self.compile(&RawTemplate::from_json(template, functions)?)
    }

    fn compile_node(&self, node: &RawTemplate) -> Result<TemplateNode, ConverterError> {
        match node {
            RawTemplate::Value(value) => self.compile_value(value),
            RawTemplate::Function(function) => self.compile_call(function, &[]),
            RawTemplate::Group(items) => match items.split_first() {
                Some((RawTemplate::Function(function), args)) if !args.is_empty() => {
                    self.compile_call(function, args)
                }
                _ => {
                    // Elements are still compiled so that path syntax errors surface.
                    for item in items {
                        self.compile_node(item)?;
                    }
                    Ok(TemplateNode::Unsupported {
                        kind: format!(
                            "grouping of {} element(s) without a leading function",
                            items.len()
                        ),
                    })
                }
            },
            RawTemplate::Object(entries) => {
                let mut compiled: Vec<(String, TemplateNode)> = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    if compiled.iter().any(|(k, _)| k == key) {
                        return Err(ConverterError::InvalidTemplate(format!(
                            "duplicate key '{}' in object template",
                            key
                        )));
                    }
                    compiled.push((key.clone(), self.compile_node(value)?));
                }
                Ok(TemplateNode::Mapping(compiled))
            }
            RawTemplate::Array(items) => Ok(TemplateNode::Sequence(
                items
                    .iter()
                    .map(|item| self.compile_node(item))
                    .collect::<Result<_, _>>()?,
            )),
        }
    }

    fn compile_value(&self, value: &Value) -> Result<TemplateNode, ConverterError> {
        match value {
            Value::String(s) if jpath::is_path(s) => {
                let expr = jpath::parse_path(s).map_err(|source| ConverterError::TemplateSyntax {
                    expression: s.clone(),
                    source,
                })?;
                Ok(TemplateNode::PathRef(expr))
            }
            Value::Object(map) => Ok(TemplateNode::Mapping(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), self.compile_value(v)?)))
                    .collect::<Result<_, ConverterError>>()?,
            )),
            Value::Array(items) => Ok(TemplateNode::Sequence(
                items
                    .iter()
                    .map(|item| self.compile_value(item))
                    .collect::<Result<_, _>>()?,
            )),
            scalar => Ok(TemplateNode::Literal(scalar.clone())),
        }
    }

    fn compile_call(
        &self,
        function: &FunctionRef,
        args: &[RawTemplate],
    ) -> Result<TemplateNode, ConverterError> {
        let arity = function.arity();
        if !arity.accepts(args.len()) {
            return Err(ConverterError::Arity {
                function: function.name().to_string(),
                expected: arity,
                found: args.len(),
            });
        }
        Ok(TemplateNode::Computed {
            function: function.clone(),
            args: args
                .iter()
                .map(|arg| self.compile_node(arg))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Compiles `template` with a default [`Compiler`].
pub fn compile(template: &RawTemplate) -> Result<CompiledTemplate, ConverterError> {
    Compiler::new().compile(template)
}
