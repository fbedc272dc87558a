//! A small, JSON-native path query language.
//!
//! Queries are rooted at `$` and use dot/bracket notation (`$.a.b`,
//! `$['a'][0]`, `$..name`, `$.items[*]`, `$.items[1:3]`). A parsed
//! [`PathExpression`] is immutable and can be evaluated against any number of
//! documents. Evaluation yields every matching node in document order; callers
//! that need a single value decide how to treat zero or several matches.

pub mod ast;
pub mod engine;
pub mod error;
mod parser;

// --- Public API ---
pub use ast::{PathExpression, Segment, Selector};
pub use engine::{select, select_first};
pub use error::JPathError;
pub use parser::parse_path;

/// Returns true if `text` should be treated as a path query rather than a plain string.
pub fn is_path(text: &str) -> bool {
    text.starts_with('$')
}
