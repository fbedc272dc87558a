use crate::ast::RawTemplate;
use crate::compiler::{CompiledTemplate, Compiler};
use crate::error::ConverterError;
use crate::executor::{ConvertOptions, TemplateExecutor};
use crate::filter::{AcceptAll, AdmissionFilter};
use crate::function::FunctionRegistry;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The outcome of [`Converter::convert`].
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// False when the admission filter rejected the document.
    pub applied: bool,
    /// The converted document, or the untouched source when not applied.
    pub document: Value,
}

impl Conversion {
    pub fn into_parts(self) -> (bool, Value) {
        (self.applied, self.document)
    }
}

/// Applies one compiled template to source documents.
///
/// A converter is immutable once built and can be cloned cheaply or shared
/// between threads.
#[derive(Clone)]
pub struct Converter {
    template: Arc<CompiledTemplate>,
    filter: Arc<dyn AdmissionFilter>,
    options: ConvertOptions,
}

impl Converter {
    pub fn new(template: CompiledTemplate) -> Self {
        Self {
            template: Arc::new(template),
            filter: Arc::new(AcceptAll),
            options: ConvertOptions::default(),
        }
    }

    /// Compiles `template` and wraps it in a converter.
    pub fn from_raw(template: &RawTemplate) -> Result<Self, ConverterError> {
        Ok(Self::new(Compiler::new().compile(template)?))
    }

    /// Compiles a JSON template whose computed values name functions in `functions`.
    pub fn from_json(template: &Value, functions: &FunctionRegistry) -> Result<Self, ConverterError> {
        Ok(Self::new(Compiler::new().compile_json(template, functions)?))
    }

    pub fn with_filter<F: AdmissionFilter + 'static>(mut self, filter: F) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn template(&self) -> &CompiledTemplate {
        &self.template
    }

    pub fn options(&self) -> ConvertOptions {
        self.options
    }

    /// Returns true if `document` passes the admission filter.
    pub fn filter(&self, document: &Value) -> bool {
        self.filter.admit(document)
    }

    /// Converts `document` with the compiled template.
    ///
    /// Returns `applied = false` with a copy of the source when the admission
    /// filter rejects it. Every other failure is an error.
    pub fn convert(&self, document: &Value) -> Result<Conversion, ConverterError> {
        if !self.filter(document) {
            log::debug!("Document rejected by admission filter, left unconverted");
            return Ok(Conversion {
                applied: false,
                document: document.clone(),
            });
        }

        let mut executor = TemplateExecutor::new(document, self.options);
        let converted = executor.evaluate(self.template.root())?;
        log::debug!("Document converted");
        Ok(Conversion {
            applied: true,
            document: converted,
        })
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("template", &self.template)
            .field("filter", &"Arc<dyn AdmissionFilter>")
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RequireFields;
    use crate::function::{Arity, FunctionRef};
    use serde_json::json;
    use std::sync::Mutex;

    fn uppercase() -> FunctionRef {
        FunctionRegistry::with_builtins().get("uppercase").cloned().unwrap()
    }

    #[test]
    fn test_path_resolution() {
        let converter = Converter::from_raw(&json!({ "k": "$.x" }).into()).unwrap();
        let result = converter.convert(&json!({ "x": 5 })).unwrap();
        assert_eq!(result.into_parts(), (true, json!({ "k": 5 })));
    }

    #[test]
    fn test_missing_path() {
        let converter = Converter::from_raw(&json!({ "k": "$.x" }).into()).unwrap();
        let err = converter.convert(&json!({})).unwrap_err();
        assert!(matches!(err, ConverterError::PathNotFound { .. }));
    }

    #[test]
    fn test_computed_argument() {
        let template = RawTemplate::object([("b", RawTemplate::call(uppercase(), ["$.name".into()]))]);
        let converter = Converter::from_raw(&template).unwrap();
        let result = converter.convert(&json!({ "name": "bob" })).unwrap();
        assert_eq!(result.into_parts(), (true, json!({ "b": "BOB" })));
    }

    #[test]
    fn test_literal_identity() {
        let literal = json!({
            "Version": "2.D.V04",
            "Priority": "Medium",
            "Count": 3,
            "Flags": [true, false, null],
            "Nested": { "Category": ["SIEM"], "Ratio": 0.5 }
        });
        let converter = Converter::from_raw(&literal.clone().into()).unwrap();
        for doc in [json!({}), json!(null), json!({ "Version": "other" }), json!([1, 2])] {
            assert_eq!(converter.convert(&doc).unwrap().document, literal);
        }
    }

    #[test]
    fn test_filter_returns_source_unchanged() {
        let converter = Converter::from_raw(&json!({ "k": "$.x" }).into())
            .unwrap()
            .with_filter(|_: &Value| false);
        let doc = json!({ "y": [1, { "z": null }] });
        let result = converter.convert(&doc).unwrap();
        assert!(!result.applied);
        assert_eq!(result.document, json!({ "y": [1, { "z": null }] }));
    }

    #[test]
    fn test_require_fields_filter() {
        let converter = Converter::from_raw(&json!({ "k": "$.x" }).into())
            .unwrap()
            .with_filter(RequireFields::new(["x"]));
        assert!(converter.convert(&json!({ "x": 1 })).unwrap().applied);
        assert!(!converter.convert(&json!({ "y": 1 })).unwrap().applied);
    }

    #[test]
    fn test_container_shape_matches_template() {
        let template = json!({
            "a": "$.v",
            "b": ["$.v", "$.w", "lit"],
            "c": { "d": "$.w", "e": [] },
        });
        let converter = Converter::from_raw(&template.into()).unwrap();
        for doc in [
            json!({ "v": 1, "w": "x", "extra": true }),
            json!({ "v": [1, 2, 3], "w": { "deep": 1 } }),
        ] {
            let out = converter.convert(&doc).unwrap().document;
            let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
            assert_eq!(keys, vec!["a", "b", "c"]);
            assert_eq!(out["b"].as_array().unwrap().len(), 3);
            let inner: Vec<_> = out["c"].as_object().unwrap().keys().cloned().collect();
            assert_eq!(inner, vec!["d", "e"]);
            assert_eq!(out["c"]["e"], json!([]));
        }
    }

    #[test]
    fn test_argument_order_and_single_invocation() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorder = {
            let calls = Arc::clone(&calls);
            FunctionRef::new("record", Arity::Any, move |args| {
                calls.lock().unwrap().push(args.clone());
                Ok(Value::Array(args))
            })
        };
        let template = RawTemplate::object([(
            "r",
            RawTemplate::call(
                recorder,
                ["$.c".into(), "$.a".into(), "lit".into(), "$.b".into()],
            ),
        )]);
        let converter = Converter::from_raw(&template).unwrap();
        let out = converter
            .convert(&json!({ "a": 1, "b": 2, "c": 3 }))
            .unwrap()
            .document;
        assert_eq!(out, json!({ "r": [3, 1, "lit", 2] }));
        assert_eq!(*calls.lock().unwrap(), vec![vec![json!(3), json!(1), json!("lit"), json!(2)]]);
    }

    #[test]
    fn test_computed_result_is_not_reconverted() {
        let emit_path = FunctionRef::new("emit", Arity::Exact(0), |_| Ok(json!("$.not_a_path")));
        let converter =
            Converter::from_raw(&RawTemplate::object([("p", RawTemplate::Function(emit_path))])).unwrap();
        let out = converter.convert(&json!({})).unwrap().document;
        assert_eq!(out, json!({ "p": "$.not_a_path" }));
    }

    #[test]
    fn test_converter_is_shareable_across_threads() {
        let converter = Converter::from_raw(&json!({ "k": "$.x" }).into()).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let converter = converter.clone();
                std::thread::spawn(move || converter.convert(&json!({ "x": i })).unwrap().document)
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), json!({ "k": i }));
        }
    }

    #[test]
    fn test_source_document_is_not_mutated() {
        let template = RawTemplate::object([("b", RawTemplate::call(uppercase(), ["$.name".into()]))]);
        let converter = Converter::from_raw(&template).unwrap();
        let doc = json!({ "name": "bob" });
        let before = doc.clone();
        converter.convert(&doc).unwrap();
        assert_eq!(doc, before);
    }
}
