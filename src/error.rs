//! Error types for value coercion, adaptation, registration and dispatch.

use thiserror::Error;

use crate::value::Tag;

/// Boxed error returned by a wrapped function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias used across the crate.
pub type UdfResult<T> = Result<T, UdfError>;

/// A value could not be coerced to the requested shape.
///
/// Produced by the accessors on [`Value`](crate::Value) and by the generic
/// adapter's conversion layer. It carries no argument position; use
/// [`ConversionError::at`] to attach one when the value was a call argument.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The stored tag has no coercion to the expected shape
    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: Tag },

    /// The tag is compatible but the payload would not survive the conversion
    #[error("{value} cannot be represented as {expected} without loss")]
    Lossy { expected: String, value: String },

    /// An element of an array failed to convert
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ConversionError>,
    },

    /// A field of an object failed to convert
    #[error("field '{key}': {source}")]
    Field {
        key: String,
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    pub fn mismatch(expected: impl Into<String>, actual: Tag) -> Self {
        ConversionError::TypeMismatch {
            expected: expected.into(),
            actual,
        }
    }

    pub fn lossy(expected: impl Into<String>, value: impl ToString) -> Self {
        ConversionError::Lossy {
            expected: expected.into(),
            value: value.to_string(),
        }
    }

    pub fn element(index: usize, source: ConversionError) -> Self {
        ConversionError::Element {
            index,
            source: Box::new(source),
        }
    }

    pub fn field(key: impl Into<String>, source: ConversionError) -> Self {
        ConversionError::Field {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Attributes this failure to the argument at `position`.
    pub fn at(self, position: usize) -> UdfError {
        UdfError::TypeMismatch {
            position,
            source: self,
        }
    }
}

/// Errors surfaced by adaptation, registration, lookup and calls.
#[derive(Error, Debug)]
pub enum UdfError {
    /// A function's signature cannot be wrapped by the generic adapter
    #[error("cannot adapt function: {0}")]
    Adaptation(String),

    /// A function is already bound to the name
    #[error("function '{0}' is already registered")]
    DuplicateRegistration(String),

    /// The name does not match the configured identifier grammar
    #[error("'{0}' is not a valid function name")]
    InvalidName(String),

    /// The registry configuration is unusable
    #[error("invalid registry configuration: {0}")]
    InvalidConfig(String),

    /// No function is bound to the name
    #[error("function '{0}' is not registered")]
    NotFound(String),

    /// A function is bound to the name but rejects the arity
    #[error("function '{name}' does not accept {arity} argument(s)")]
    ArityNotAccepted { name: String, arity: usize },

    /// An argument's runtime tag cannot be coerced to what the function needs
    #[error("type mismatch at argument {position}: {source}")]
    TypeMismatch {
        position: usize,
        #[source]
        source: ConversionError,
    },

    /// Semantic misuse detected by a function's own logic
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A wrapped function's return value has no Value representation
    #[error("cannot convert return value: {0}")]
    Return(#[source] ConversionError),

    /// Error returned by a wrapped function
    #[error("function failed: {0}")]
    Failed(#[source] BoxError),
}

impl UdfError {
    /// Argument position of a type mismatch, if this is one.
    pub fn position(&self) -> Option<usize> {
        match self {
            UdfError::TypeMismatch { position, .. } => Some(*position),
            _ => None,
        }
    }
}
