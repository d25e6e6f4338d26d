use std::fmt;

use crate::{context::Context, error::UdfResult, value::Value};

/// The dispatch contract every user-defined function implements.
///
/// A function is looked up by name, then asked whether it [`accept`]s the
/// number of arguments at the call site and which positions are
/// [aggregation parameters](Udf::is_aggregation_parameter). Only then is it
/// [`call`]ed.
///
/// One instance serves the whole process and is invoked once per incoming
/// tuple, possibly from many threads at once. Implementations must therefore
/// be `Send + Sync` and keep any mutable state behind their own
/// synchronization.
///
/// [`accept`]: Udf::accept
/// [`call`]: Udf::call
///
/// # Examples
///
/// ```
/// use clove_udf::{Context, Udf, UdfResult, Value};
///
/// struct Double;
///
/// impl Udf for Double {
///     fn call(&self, _ctx: &Context, args: &[Value]) -> UdfResult<Value> {
///         let n = args[0].as_int().map_err(|e| e.at(0))?;
///         Ok(Value::Integer(n * 2))
///     }
///
///     fn accept(&self, arity: usize) -> bool {
///         arity == 1
///     }
///
///     fn is_aggregation_parameter(&self, _k: usize) -> bool {
///         false
///     }
/// }
///
/// let ctx = Context::new();
/// assert_eq!(Double.call(&ctx, &[Value::Integer(21)]).unwrap(), Value::Integer(42));
/// assert!(!Double.is_aggregate(1));
/// ```
pub trait Udf: Send + Sync {
    /// Invokes the function.
    ///
    /// Callers guarantee `self.accept(args.len())` holds. Argument types are
    /// not checked by anyone else, so the implementation must validate them.
    fn call(&self, ctx: &Context, args: &[Value]) -> UdfResult<Value>;

    /// Returns true if the function can be called with `arity` arguments.
    ///
    /// Must be a pure function of `arity`.
    fn accept(&self, arity: usize) -> bool;

    /// Returns true if the `k`-th argument (zero-based) receives the array of
    /// all values of a group instead of a single value.
    ///
    /// Positions outside every accepted arity must answer `false`.
    fn is_aggregation_parameter(&self, k: usize) -> bool;

    /// A function is an aggregate for `arity` iff at least one of its
    /// parameters is an aggregation parameter.
    fn is_aggregate(&self, arity: usize) -> bool {
        (0..arity).any(|k| self.is_aggregation_parameter(k))
    }
}

/// Accepted argument counts of a function with a fixed signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` arguments
    Exact(usize),

    /// `n` required arguments followed by any number of optional ones
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, arity: usize) -> bool {
        match self {
            Arity::Exact(n) => arity == n,
            Arity::AtLeast(n) => arity >= n,
        }
    }

    /// Number of arguments that must always be present
    pub fn required(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::AtLeast(n) => n,
        }
    }

    pub fn is_variadic(self) -> bool {
        matches!(self, Arity::AtLeast(_))
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}
