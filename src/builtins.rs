//! Built-in functions and the routine that installs them.
//!
//! `join`, `count` and `string_agg` implement [`Udf`](crate::Udf) directly;
//! `str_join` and `concat` are plain functions wrapped by the generic adapter.

mod aggregate;
mod join;

pub use aggregate::{Count, StringAgg};
pub use join::Join;

use crate::{
    error::UdfResult,
    generic::{Rest, convert_generic},
    registry::Registry,
};

/// `str_join(["a", "b"], sep)`
pub fn str_join(parts: Vec<String>, separator: String) -> String {
    parts.join(&separator)
}

/// `concat(s, ...)`
pub fn concat(first: String, rest: Rest<String>) -> String {
    let mut out = first;
    for s in rest.iter() {
        out.push_str(s);
    }
    out
}

/// Installs every built-in function into `registry`.
///
/// Called explicitly by the embedding engine during start-up, before
/// dispatching begins. Fails if any built-in name is already taken.
///
/// ```
/// use clove_udf::{Context, Registry, Value, builtins};
///
/// let registry = Registry::new();
/// builtins::install(&registry).unwrap();
///
/// let args = [Value::from("a"), Value::from("b"), Value::from("-")];
/// assert_eq!(registry.call(&Context::new(), "join", &args).unwrap(), Value::from("a-b"));
/// ```
pub fn install(registry: &Registry) -> UdfResult<()> {
    registry.register("join", Join)?;
    registry.register("str_join", convert_generic(str_join)?)?;
    registry.register("concat", convert_generic(concat)?)?;
    registry.register("count", Count)?;
    registry.register("string_agg", StringAgg)?;
    Ok(())
}
