//! Aggregate functions. Their aggregation parameters receive an array holding
//! the values of one group.

use crate::{
    context::Context,
    error::{ConversionError, UdfError, UdfResult},
    udf::Udf,
    value::Value,
};

/// `count(values)`: number of non-null values in the group.
#[derive(Debug, Default, Clone, Copy)]
pub struct Count;

impl Udf for Count {
    fn call(&self, _ctx: &Context, args: &[Value]) -> UdfResult<Value> {
        let Some(group) = args.first() else {
            return Err(UdfError::InvalidArgument("count requires a group".to_string()));
        };
        let group = group.as_array().map_err(|e| e.at(0))?;
        let count = group.iter().filter(|v| !v.is_null()).count();
        Ok(Value::Integer(count as i64))
    }

    fn accept(&self, arity: usize) -> bool {
        arity == 1
    }

    fn is_aggregation_parameter(&self, k: usize) -> bool {
        k == 0
    }
}

/// `string_agg(values, separator)`: non-null strings of the group joined with
/// `separator`, or null when there are none.
///
/// ```
/// use clove_udf::builtins::StringAgg;
/// use clove_udf::{Context, Udf, Value};
///
/// let group = Value::Array(vec![Value::from("a"), Value::Null, Value::from("b")]);
/// let result = StringAgg.call(&Context::new(), &[group, Value::from("|")]).unwrap();
/// assert_eq!(result, Value::from("a|b"));
/// assert!(StringAgg.is_aggregation_parameter(0));
/// assert!(!StringAgg.is_aggregation_parameter(1));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct StringAgg;

impl Udf for StringAgg {
    fn call(&self, _ctx: &Context, args: &[Value]) -> UdfResult<Value> {
        let [group, separator] = args else {
            return Err(UdfError::InvalidArgument(format!(
                "string_agg takes a group and a separator, got {} argument(s)",
                args.len()
            )));
        };
        let group = group.as_array().map_err(|e| e.at(0))?;
        let separator = separator.as_str().map_err(|e| e.at(1))?;

        let mut parts = Vec::with_capacity(group.len());
        for (index, value) in group.iter().enumerate() {
            if value.is_null() {
                continue;
            }
            let s = value
                .as_str()
                .map_err(|e| ConversionError::element(index, e).at(0))?;
            parts.push(s);
        }

        if parts.is_empty() {
            return Ok(Value::Null);
        }
        Ok(Value::String(parts.join(separator)))
    }

    fn accept(&self, arity: usize) -> bool {
        arity == 2
    }

    fn is_aggregation_parameter(&self, k: usize) -> bool {
        k == 0
    }
}
