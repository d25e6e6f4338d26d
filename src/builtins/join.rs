use crate::{
    context::Context,
    error::{UdfError, UdfResult},
    udf::Udf,
    value::Value,
};

/// String join with two call shapes, told apart by the first argument's tag.
///
/// - `join("a", "b", ..., sep)`: every argument is a string, the last one is
///   the separator
/// - `join(["a", "b", ...], sep)`: an array of strings and a separator,
///   exactly two arguments
///
/// A single argument yields the empty string.
///
/// ```
/// use clove_udf::builtins::Join;
/// use clove_udf::{Context, Udf, Value};
///
/// let ctx = Context::new();
/// let parts = Value::Array(vec![Value::from("a"), Value::from("b"), Value::from("c")]);
///
/// assert_eq!(Join.call(&ctx, &[parts, Value::from(",")]).unwrap(), Value::from("a,b,c"));
/// assert_eq!(Join.call(&ctx, &[Value::from("solo")]).unwrap(), Value::from(""));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Join;

impl Udf for Join {
    fn call(&self, _ctx: &Context, args: &[Value]) -> UdfResult<Value> {
        let Some((first, _)) = args.split_first() else {
            return Ok(Value::from(""));
        };
        if args.len() == 1 {
            return Ok(Value::from(""));
        }

        match first {
            Value::String(_) => {
                let mut parts = Vec::with_capacity(args.len());
                for (position, arg) in args.iter().enumerate() {
                    parts.push(arg.as_str().map_err(|e| e.at(position))?);
                }
                let separator = parts.pop().unwrap_or_default();
                Ok(Value::String(parts.join(separator)))
            }
            Value::Array(_) => {
                if args.len() != 2 {
                    return Err(UdfError::InvalidArgument(format!(
                        "join(array, separator) takes exactly 2 arguments, got {}",
                        args.len()
                    )));
                }
                let separator = args[1].as_str().map_err(|e| e.at(1))?;
                first
                    .join_strings(separator)
                    .map(Value::String)
                    .map_err(|e| e.at(0))
            }
            other => Err(UdfError::InvalidArgument(format!(
                "the first argument of join must be a string or an array, got {}",
                other.tag()
            ))),
        }
    }

    fn accept(&self, arity: usize) -> bool {
        arity >= 1
    }

    fn is_aggregation_parameter(&self, _k: usize) -> bool {
        false
    }
}
