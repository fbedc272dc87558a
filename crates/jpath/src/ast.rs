//! Defines the Abstract Syntax Tree (AST) for path queries.
use std::fmt;

/// A single selector inside a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// An object member (e.g., `.name` or `['name']`).
    Name(String),
    /// An array element (e.g., `[0]`). Negative indices count from the end.
    Index(i64),
    /// An array slice (e.g., `[1:3]` or `[::2]`).
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    /// Every child of an object or array (`.*` or `[*]`).
    Wildcard,
}

/// One step of a query. A descendant segment applies its selectors to the
/// current node and to every node below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub selectors: Vec<Selector>,
    pub descendant: bool,
}

impl Segment {
    pub fn child(selectors: Vec<Selector>) -> Self {
        Self { selectors, descendant: false }
    }

    pub fn descendant(selectors: Vec<Selector>) -> Self {
        Self { selectors, descendant: true }
    }
}

/// A parsed query, rooted at `$`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    source: String,
    segments: Vec<Segment>,
}

impl PathExpression {
    pub(crate) fn new(source: &str, segments: Vec<Segment>) -> Self {
        Self { source: source.to_string(), segments }
    }

    /// The query text this expression was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the query can yield at most one node (no wildcard, slice,
    /// union or descendant segment).
    pub fn is_singular(&self) -> bool {
        self.segments.iter().all(|seg| {
            !seg.descendant
                && seg.selectors.len() == 1
                && matches!(seg.selectors[0], Selector::Name(_) | Selector::Index(_))
        })
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
