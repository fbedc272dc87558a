//! Function references usable as computed values, and a registry of named functions.
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// An error raised by a computed-value function.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct FunctionError(pub String);

impl FunctionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
            Arity::Any => f.write_str("any number of"),
        }
    }
}

/// A function that can be embedded in a template as a computed value.
///
/// Implementations must not rely on shared mutable state of the converter;
/// side effects such as reading the clock are allowed.
pub trait ComputedFunction: Send + Sync {
    fn name(&self) -> &str;

    fn arity(&self) -> Arity;

    /// Called with fully resolved arguments, in declared order.
    fn evaluate(&self, args: Vec<Value>) -> Result<Value, FunctionError>;
}

struct NativeFunction<F> {
    name: String,
    arity: Arity,
    func: F,
}

impl<F> ComputedFunction for NativeFunction<F>
where
    F: Fn(Vec<Value>) -> Result<Value, FunctionError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> Arity {
        self.arity
    }

    fn evaluate(&self, args: Vec<Value>) -> Result<Value, FunctionError> {
        (self.func)(args)
    }
}

/// A cheaply clonable, shared reference to a [`ComputedFunction`].
///
/// Two references are equal when they point at the same function instance.
#[derive(Clone)]
pub struct FunctionRef(Arc<dyn ComputedFunction>);

impl FunctionRef {
    /// Wraps a closure as a named function with the given arity.
    pub fn new<F>(name: &str, arity: Arity, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        Self(Arc::new(NativeFunction {
            name: name.to_string(),
            arity,
            func,
        }))
    }

    pub fn from_function<T: ComputedFunction + 'static>(function: T) -> Self {
        Self(Arc::new(function))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn arity(&self) -> Arity {
        self.0.arity()
    }

    pub fn call(&self, args: Vec<Value>) -> Result<Value, FunctionError> {
        self.0.evaluate(args)
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRef")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .finish()
    }
}

/// A registry of functions addressable by name from JSON templates.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionRef>,
}

impl FunctionRegistry {
    /// Creates a new, empty function registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated with the generic built-in functions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(FunctionRef::new("uppercase", Arity::Exact(1), uppercase));
        registry.register(FunctionRef::new("lowercase", Arity::Exact(1), lowercase));
        registry.register(FunctionRef::new("concat", Arity::Any, concat));
        registry.register(FunctionRef::new("list", Arity::Any, |args| Ok(Value::Array(args))));
        registry.register(FunctionRef::new("coalesce", Arity::AtLeast(1), coalesce));
        registry
    }

    /// Registers a function under its own name, replacing any previous entry.
    pub fn register(&mut self, function: FunctionRef) {
        self.functions
            .insert(function.name().to_lowercase(), function);
    }

    /// Finds a function by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&FunctionRef> {
        self.functions.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

// --- Helper for string coercion ---
pub fn to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// --- Built-in Function Implementations ---

fn uppercase(args: Vec<Value>) -> Result<Value, FunctionError> {
    match args.first() {
        Some(Value::String(s)) => Ok(s.to_uppercase().into()),
        Some(other) => Err(FunctionError::new(format!("uppercase expects a string, got {}", other))),
        None => Err(FunctionError::new("uppercase expects one argument")),
    }
}

fn lowercase(args: Vec<Value>) -> Result<Value, FunctionError> {
    match args.first() {
        Some(Value::String(s)) => Ok(s.to_lowercase().into()),
        Some(other) => Err(FunctionError::new(format!("lowercase expects a string, got {}", other))),
        None => Err(FunctionError::new("lowercase expects one argument")),
    }
}

fn concat(args: Vec<Value>) -> Result<Value, FunctionError> {
    Ok(args.iter().map(to_text).collect::<String>().into())
}

fn coalesce(args: Vec<Value>) -> Result<Value, FunctionError> {
    Ok(args.into_iter().find(|v| !v.is_null()).unwrap_or(Value::Null))
}
