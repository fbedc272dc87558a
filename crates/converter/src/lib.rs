//! Template-driven JSON to JSON conversion.
//!
//! A template describes the shape of the output document. Its leaves are
//! literals, path expressions (strings starting with `$`, resolved against the
//! source document) or computed values (a function applied to argument
//! sub-templates). Templates are compiled once and reused for any number of
//! documents:
//!
//! ```ignore
//! use idmef_converter::{Converter, FunctionRegistry, RawTemplate};
//! use serde_json::json;
//!
//! let functions = FunctionRegistry::with_builtins();
//! let upper = functions.get("uppercase").cloned().unwrap();
//! let template = RawTemplate::object([
//!     ("id", "$.sid".into()),
//!     ("user", RawTemplate::call(upper, ["$.user".into()])),
//! ]);
//! let converter = Converter::from_raw(&template)?;
//! let (applied, alert) = converter.convert(&json!({"sid": "42", "user": "bob"}))?.into_parts();
//! ```

pub mod ast;
pub mod compiler;
pub mod converter;
pub mod error;
pub mod executor;
pub mod filter;
pub mod function;
pub mod resolver;

pub use ast::RawTemplate;
pub use compiler::{CompiledTemplate, Compiler, TemplateNode, compile};
pub use converter::{Conversion, Converter};
pub use error::ConverterError;
pub use executor::{ConvertOptions, TemplateExecutor, UnknownNodePolicy, evaluate, invoke};
pub use filter::{AcceptAll, AdmissionFilter, RequireFields};
pub use function::{Arity, ComputedFunction, FunctionError, FunctionRef, FunctionRegistry};
pub use resolver::{MatchPolicy, resolve, resolve_with};

pub use idmef_jpath::{JPathError, PathExpression};
