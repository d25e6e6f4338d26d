use std::fmt;

/// Runtime description of a parameter or return type of an adapted function.
///
/// Every type usable with the generic adapter reports its `Shape`; the adapter
/// inspects these once, when the function is wrapped, and refuses shapes it
/// cannot convert losslessly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Any value, passed through unconverted
    Any,
    /// No value (`()`)
    Unit,
    Bool,
    Int,
    Float,
    String,
    Timestamp,
    Blob,
    Array(Box<Shape>),
    Object(Box<Shape>),
    /// `null` or the inner shape
    Nullable(Box<Shape>),
}

impl Shape {
    /// Checks that values of this shape can be converted in both directions
    /// without ambiguity.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Shape::Unit => Err("unit has no value representation".to_string()),
            Shape::Nullable(inner) => match inner.as_ref() {
                Shape::Nullable(_) => Err(format!(
                    "{} is ambiguous: null cannot tell the two levels apart",
                    self
                )),
                Shape::Any => Err(format!(
                    "{} is ambiguous: any value may already be null",
                    self
                )),
                other => other.validate(),
            },
            Shape::Array(inner) | Shape::Object(inner) => inner.validate(),
            Shape::Any
            | Shape::Bool
            | Shape::Int
            | Shape::Float
            | Shape::String
            | Shape::Timestamp
            | Shape::Blob => Ok(()),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Any => f.write_str("any"),
            Shape::Unit => f.write_str("unit"),
            Shape::Bool => f.write_str("boolean"),
            Shape::Int => f.write_str("integer"),
            Shape::Float => f.write_str("float"),
            Shape::String => f.write_str("string"),
            Shape::Timestamp => f.write_str("timestamp"),
            Shape::Blob => f.write_str("blob"),
            Shape::Array(inner) => write!(f, "array of {}", inner),
            Shape::Object(inner) => write!(f, "object of {}", inner),
            Shape::Nullable(inner) => write!(f, "nullable {}", inner),
        }
    }
}

/// How a parameter consumes arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamShape {
    /// Exactly one argument
    Single(Shape),
    /// All remaining arguments, each of the given shape
    Variadic(Shape),
}

impl ParamShape {
    pub fn shape(&self) -> &Shape {
        match self {
            ParamShape::Single(shape) | ParamShape::Variadic(shape) => shape,
        }
    }
}

impl fmt::Display for ParamShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamShape::Single(shape) => write!(f, "{}", shape),
            ParamShape::Variadic(shape) => write!(f, "{}...", shape),
        }
    }
}
