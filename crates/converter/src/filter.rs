//! Admission filters decide whether a source document is converted at all.
use serde_json::Value;

/// A predicate over source documents.
pub trait AdmissionFilter: Send + Sync {
    /// Returns true if the document must be converted.
    fn admit(&self, document: &Value) -> bool;
}

impl<F> AdmissionFilter for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn admit(&self, document: &Value) -> bool {
        self(document)
    }
}

/// Admits every document.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl AdmissionFilter for AcceptAll {
    fn admit(&self, _document: &Value) -> bool {
        true
    }
}

/// Admits objects that contain every listed top-level key.
#[derive(Debug, Clone, Default)]
pub struct RequireFields {
    fields: Vec<String>,
}

impl RequireFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl AdmissionFilter for RequireFields {
    fn admit(&self, document: &Value) -> bool {
        match document.as_object() {
            Some(map) => self.fields.iter().all(|f| map.contains_key(f)),
            None => false,
        }
    }
}
