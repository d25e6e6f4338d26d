use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::ConversionError;

/// Largest magnitude an integer may have and still convert to `f64` exactly.
const MAX_EXACT_FLOAT_INT: u64 = 1 << 53;

/// A dynamically typed value passed across the function dispatch boundary.
///
/// Arguments and results of every user-defined function are `Value`s. The tag
/// (see [`Value::tag`]) fully determines which accessors succeed; coercions
/// between tags are explicit and fallible and never lose information.
///
/// # Examples
///
/// ```
/// use clove_udf::{Tag, Value};
/// use std::collections::HashMap;
///
/// // Scalar values
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let integer = Value::Integer(42);
/// let float = Value::Float(3.14);
/// let string = Value::from("hello");
///
/// // Collections
/// let array = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
///
/// let mut obj = HashMap::new();
/// obj.insert("key".to_string(), Value::from("value"));
/// let object = Value::Object(obj);
///
/// assert_eq!(array.tag(), Tag::Array);
/// assert_eq!(integer.as_float(), Ok(42.0));
/// assert!(string.as_int().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value
    Null,

    /// true/false
    Boolean(bool),

    /// Signed 64-bit integer
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Point in time, always UTC
    Timestamp(DateTime<Utc>),

    /// Ordered sequence of values (homogeneous or heterogeneous)
    Array(Vec<Value>),

    /// Mapping from string keys to values
    Object(HashMap<String, Value>),

    /// Raw bytes
    Blob(Vec<u8>),
}

/// The closed set of tags a [`Value`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Timestamp,
    Array,
    Object,
    Blob,
}

impl Tag {
    /// Human-readable tag name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::Boolean => "boolean",
            Tag::Integer => "integer",
            Tag::Float => "float",
            Tag::String => "string",
            Tag::Timestamp => "timestamp",
            Tag::Array => "array",
            Tag::Object => "object",
            Tag::Blob => "blob",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Returns the tag of the stored payload.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Null => Tag::Null,
            Value::Boolean(_) => Tag::Boolean,
            Value::Integer(_) => Tag::Integer,
            Value::Float(_) => Tag::Float,
            Value::String(_) => Tag::String,
            Value::Timestamp(_) => Tag::Timestamp,
            Value::Array(_) => Tag::Array,
            Value::Object(_) => Tag::Object,
            Value::Blob(_) => Tag::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Result<bool, ConversionError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(ConversionError::mismatch("boolean", other.tag())),
        }
    }

    /// Get as integer.
    ///
    /// Floats are accepted only when they are finite, integral and inside the
    /// `i64` range.
    pub fn as_int(&self) -> Result<i64, ConversionError> {
        match self {
            Value::Integer(n) => Ok(*n),
            Value::Float(n) => {
                // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
                if n.is_finite() && n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 {
                    Ok(*n as i64)
                } else {
                    Err(ConversionError::lossy("integer", n))
                }
            }
            other => Err(ConversionError::mismatch("integer", other.tag())),
        }
    }

    /// Get as float.
    ///
    /// Integers are accepted when they fit the 53-bit mantissa exactly.
    pub fn as_float(&self) -> Result<f64, ConversionError> {
        match self {
            Value::Float(n) => Ok(*n),
            Value::Integer(n) if n.unsigned_abs() <= MAX_EXACT_FLOAT_INT => Ok(*n as f64),
            Value::Integer(n) => Err(ConversionError::lossy("float", n)),
            other => Err(ConversionError::mismatch("float", other.tag())),
        }
    }

    pub fn as_str(&self) -> Result<&str, ConversionError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(ConversionError::mismatch("string", other.tag())),
        }
    }

    pub fn as_string(&self) -> Result<String, ConversionError> {
        self.as_str().map(str::to_owned)
    }

    pub fn as_timestamp(&self) -> Result<DateTime<Utc>, ConversionError> {
        match self {
            Value::Timestamp(t) => Ok(*t),
            other => Err(ConversionError::mismatch("timestamp", other.tag())),
        }
    }

    pub fn as_array(&self) -> Result<&[Value], ConversionError> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(ConversionError::mismatch("array", other.tag())),
        }
    }

    pub fn as_object(&self) -> Result<&HashMap<String, Value>, ConversionError> {
        match self {
            Value::Object(map) => Ok(map),
            other => Err(ConversionError::mismatch("object", other.tag())),
        }
    }

    pub fn as_blob(&self) -> Result<&[u8], ConversionError> {
        match self {
            Value::Blob(bytes) => Ok(bytes),
            other => Err(ConversionError::mismatch("blob", other.tag())),
        }
    }

    /// Joins an array of strings with `separator`.
    ///
    /// This is the only way to turn an array into a string: `as_str` on an
    /// array always fails.
    ///
    /// ```
    /// use clove_udf::Value;
    ///
    /// let parts = Value::Array(vec![Value::from("a"), Value::from("b")]);
    /// assert_eq!(parts.join_strings("-").unwrap(), "a-b");
    /// ```
    pub fn join_strings(&self, separator: &str) -> Result<String, ConversionError> {
        let items = self.as_array()?;
        let mut parts = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            parts.push(item.as_str().map_err(|e| ConversionError::element(index, e))?);
        }
        Ok(parts.join(separator))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::output::to_json(self))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Blob(bytes)
    }
}
