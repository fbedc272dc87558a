use crate::function::Arity;
use idmef_jpath::JPathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Template syntax error in '{expression}': {source}")]
    TemplateSyntax {
        expression: String,
        #[source]
        source: JPathError,
    },

    #[error("Function '{function}' expects {expected} argument(s), template supplies {found}")]
    Arity {
        function: String,
        expected: Arity,
        found: usize,
    },

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Path '{path}' at {location} matched nothing in the source document")]
    PathNotFound { path: String, location: String },

    #[error("Path '{path}' at {location} matched {count} values, expected exactly one")]
    AmbiguousPath {
        path: String,
        location: String,
        count: usize,
    },

    #[error("Computed value '{function}' at {location} failed: {source}")]
    ComputedValue {
        function: String,
        location: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unsupported template node at {location}: {kind}")]
    UnsupportedNode { kind: String, location: String },
}

impl ConverterError {
    /// Rewrites the template location carried by resolution errors.
    pub(crate) fn at(self, at: &str) -> Self {
        match self {
            Self::PathNotFound { path, .. } => Self::PathNotFound {
                path,
                location: at.to_string(),
            },
            Self::AmbiguousPath { path, count, .. } => Self::AmbiguousPath {
                path,
                location: at.to_string(),
                count,
            },
            other => other,
        }
    }

    /// The innermost error of a chain of `ComputedValue` wrappers.
    pub fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        if let Self::ComputedValue { source, .. } = self {
            if let Some(inner) = source.downcast_ref::<ConverterError>() {
                return inner.root_cause();
            }
            let cause: &(dyn std::error::Error + 'static) = &**source;
            return cause;
        }
        self
    }
}
