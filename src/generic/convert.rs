//! Conversions between [`Value`] and the native types the generic adapter
//! supports.

use std::collections::HashMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};

use super::shape::{ParamShape, Shape};
use crate::error::{BoxError, ConversionError, UdfError, UdfResult};
use crate::value::Value;

/// A native type that can be built from a [`Value`].
pub trait FromValue: Sized {
    fn shape() -> Shape;
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

/// A native type that can be turned into a [`Value`].
pub trait IntoValue {
    fn shape() -> Shape;
    fn into_value(self) -> Result<Value, ConversionError>;
}

impl FromValue for Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl IntoValue for Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        Ok(self)
    }
}

impl IntoValue for () {
    fn shape() -> Shape {
        Shape::Unit
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        Ok(Value::Null)
    }
}

impl FromValue for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value.as_bool()
    }
}

impl IntoValue for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        Ok(Value::Boolean(self))
    }
}

// No u8: Vec<u8> is a blob, not an array of integers.
macro_rules! integer_conversions {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn shape() -> Shape {
                    Shape::Int
                }

                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    let n = value.as_int()?;
                    <$t>::try_from(n).map_err(|_| {
                        ConversionError::lossy(concat!("integer in ", stringify!($t), " range"), n)
                    })
                }
            }

            impl IntoValue for $t {
                fn shape() -> Shape {
                    Shape::Int
                }

                fn into_value(self) -> Result<Value, ConversionError> {
                    i64::try_from(self)
                        .map(Value::Integer)
                        .map_err(|_| ConversionError::lossy("integer", self))
                }
            }
        )*
    };
}

integer_conversions!(i8, i16, i32, i64, u16, u32, u64, usize);

impl FromValue for f64 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value.as_float()
    }
}

impl IntoValue for f64 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        Ok(Value::Float(self))
    }
}

impl FromValue for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value.as_string()
    }
}

impl IntoValue for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        Ok(Value::String(self))
    }
}

impl IntoValue for &'static str {
    fn shape() -> Shape {
        Shape::String
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        Ok(Value::from(self))
    }
}

impl FromValue for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::Timestamp
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value.as_timestamp()
    }
}

impl IntoValue for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::Timestamp
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        Ok(Value::Timestamp(self))
    }
}

impl FromValue for Vec<u8> {
    fn shape() -> Shape {
        Shape::Blob
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value.as_blob().map(<[u8]>::to_vec)
    }
}

impl IntoValue for Vec<u8> {
    fn shape() -> Shape {
        Shape::Blob
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        Ok(Value::Blob(self))
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn shape() -> Shape {
        Shape::Array(Box::new(T::shape()))
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let items = value
            .as_array()
            .map_err(|_| ConversionError::mismatch(Self::shape().to_string(), value.tag()))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| T::from_value(item).map_err(|e| ConversionError::element(index, e)))
            .collect()
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn shape() -> Shape {
        Shape::Array(Box::new(T::shape()))
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        self.into_iter()
            .enumerate()
            .map(|(index, item)| item.into_value().map_err(|e| ConversionError::element(index, e)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn shape() -> Shape {
        Shape::Object(Box::new(T::shape()))
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let map = value
            .as_object()
            .map_err(|_| ConversionError::mismatch(Self::shape().to_string(), value.tag()))?;
        map.iter()
            .map(|(key, item)| {
                T::from_value(item)
                    .map(|v| (key.clone(), v))
                    .map_err(|e| ConversionError::field(key.as_str(), e))
            })
            .collect()
    }
}

impl<T: IntoValue> IntoValue for HashMap<String, T> {
    fn shape() -> Shape {
        Shape::Object(Box::new(T::shape()))
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        let mut map = HashMap::with_capacity(self.len());
        for (key, item) in self {
            let value = item
                .into_value()
                .map_err(|e| ConversionError::field(key.as_str(), e))?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn shape() -> Shape {
        Shape::Nullable(Box::new(T::shape()))
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn shape() -> Shape {
        Shape::Nullable(Box::new(T::shape()))
    }

    fn into_value(self) -> Result<Value, ConversionError> {
        match self {
            Some(v) => v.into_value(),
            None => Ok(Value::Null),
        }
    }
}

/// One parameter of an adapted function.
///
/// Implemented for every [`FromValue`] type (consuming one argument) and for
/// [`Rest`] (consuming all remaining arguments).
pub trait Param: Sized {
    fn describe() -> ParamShape;
    fn extract(args: &[Value], position: usize) -> UdfResult<Self>;
}

impl<T: FromValue> Param for T {
    fn describe() -> ParamShape {
        ParamShape::Single(T::shape())
    }

    fn extract(args: &[Value], position: usize) -> UdfResult<Self> {
        let value = args
            .get(position)
            .ok_or_else(|| UdfError::InvalidArgument(format!("missing argument {}", position)))?;
        T::from_value(value).map_err(|e| e.at(position))
    }
}

/// Variadic tail of an adapted function's parameter list.
///
/// Must be the last parameter. Receives every argument from its position on,
/// possibly none.
///
/// ```
/// use clove_udf::generic::{Rest, convert_generic};
/// use clove_udf::{Context, Udf, Value};
///
/// fn sum(first: i64, rest: Rest<i64>) -> i64 {
///     first + rest.iter().sum::<i64>()
/// }
///
/// let udf = convert_generic(sum).unwrap();
/// assert!(!udf.accept(0));
/// assert!(udf.accept(1) && udf.accept(5));
///
/// let args = [Value::Integer(1), Value::Integer(2), Value::Integer(3)];
/// assert_eq!(udf.call(&Context::new(), &args).unwrap(), Value::Integer(6));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rest<T>(pub Vec<T>);

impl<T> Rest<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for Rest<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T: FromValue> Param for Rest<T> {
    fn describe() -> ParamShape {
        ParamShape::Variadic(T::shape())
    }

    fn extract(args: &[Value], position: usize) -> UdfResult<Self> {
        args.get(position..)
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .map(|(offset, value)| T::from_value(value).map_err(|e| e.at(position + offset)))
            .collect::<UdfResult<Vec<T>>>()
            .map(Rest)
    }
}

/// Return type of an adapted function: a value, or a `Result` whose error is
/// propagated as [`UdfError::Failed`].
pub trait UdfReturn {
    fn shape() -> Shape;
    fn into_result(self) -> UdfResult<Value>;
}

impl<T: IntoValue> UdfReturn for T {
    fn shape() -> Shape {
        T::shape()
    }

    fn into_result(self) -> UdfResult<Value> {
        self.into_value().map_err(UdfError::Return)
    }
}

impl<T, E> UdfReturn for Result<T, E>
where
    T: IntoValue,
    E: Into<BoxError>,
{
    fn shape() -> Shape {
        T::shape()
    }

    fn into_result(self) -> UdfResult<Value> {
        match self {
            Ok(value) => value.into_value().map_err(UdfError::Return),
            Err(e) => Err(UdfError::Failed(e.into())),
        }
    }
}
