//! # Generic adapter
//!
//! Wraps an ordinary Rust function into a [`Udf`] without hand-writing
//! `call`, `accept` and `is_aggregation_parameter`.
//!
//! Each parameter and the return type report a [`Shape`] through the
//! [`FromValue`] / [`IntoValue`] traits. [`convert_generic`] inspects those
//! shapes once and rejects functions it cannot represent; afterwards every
//! call converts the incoming [`Value`]s, invokes the function and converts
//! the result back.
//!
//! ## Supported signatures
//!
//! - Up to eight parameters, each a [`FromValue`] type, the last one
//!   optionally a variadic [`Rest<T>`]
//! - Optionally a leading `&Context`, via [`convert_generic_with_context`]
//! - A return type that is an [`IntoValue`] type or `Result<T, E>` with
//!   `E: Into<Box<dyn Error + Send + Sync>>`
//!
//! Adapted functions are never aggregates: a plain signature cannot express
//! aggregation intent, so functions that need aggregation parameters
//! implement [`Udf`] directly.
//!
//! ## Example
//!
//! ```
//! use clove_udf::generic::convert_generic;
//! use clove_udf::{Context, Udf, Value};
//!
//! fn inc(v: i64) -> i64 {
//!     v + 1
//! }
//!
//! let udf = convert_generic(inc).unwrap();
//! assert!(udf.accept(1));
//! assert!(!udf.accept(2));
//! assert_eq!(udf.call(&Context::new(), &[Value::Integer(41)]).unwrap(), Value::Integer(42));
//! ```

mod convert;
mod shape;

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

pub use convert::{FromValue, IntoValue, Param, Rest, UdfReturn};
pub use shape::{ParamShape, Shape};

use crate::{
    context::Context,
    error::{UdfError, UdfResult},
    udf::{Arity, Udf},
    value::Value,
};

/// Marker for functions that take only converted arguments.
pub struct Plain<T>(PhantomData<T>);

/// Marker for functions whose first parameter is `&Context`.
pub struct WithContext<T>(PhantomData<T>);

/// A function the generic adapter can wrap.
///
/// `M` is an inference marker ([`Plain`] or [`WithContext`] over the
/// parameter tuple) and never needs to be named by callers.
pub trait GenericFn<M>: Send + Sync + 'static {
    /// Parameter descriptors, excluding a leading `&Context`
    fn parameters() -> Vec<ParamShape>;

    fn returns() -> Shape;

    fn invoke(&self, ctx: &Context, args: &[Value]) -> UdfResult<Value>;
}

macro_rules! impl_generic_fn {
    ($($ty:ident $var:ident),*) => {
        impl<F, R, $($ty,)*> GenericFn<Plain<($($ty,)*)>> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: UdfReturn,
            $($ty: Param,)*
        {
            fn parameters() -> Vec<ParamShape> {
                vec![$(<$ty as Param>::describe()),*]
            }

            fn returns() -> Shape {
                <R as UdfReturn>::shape()
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn invoke(&self, _ctx: &Context, args: &[Value]) -> UdfResult<Value> {
                let mut position = 0;
                $(
                    let $var = <$ty as Param>::extract(args, position)?;
                    position += 1;
                )*
                (self)($($var),*).into_result()
            }
        }

        impl<F, R, $($ty,)*> GenericFn<WithContext<($($ty,)*)>> for F
        where
            F: Fn(&Context $(, $ty)*) -> R + Send + Sync + 'static,
            R: UdfReturn,
            $($ty: Param,)*
        {
            fn parameters() -> Vec<ParamShape> {
                vec![$(<$ty as Param>::describe()),*]
            }

            fn returns() -> Shape {
                <R as UdfReturn>::shape()
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn invoke(&self, ctx: &Context, args: &[Value]) -> UdfResult<Value> {
                let mut position = 0;
                $(
                    let $var = <$ty as Param>::extract(args, position)?;
                    position += 1;
                )*
                (self)(ctx $(, $var)*).into_result()
            }
        }
    };
}

impl_generic_fn!();
impl_generic_fn!(A1 a1);
impl_generic_fn!(A1 a1, A2 a2);
impl_generic_fn!(A1 a1, A2 a2, A3 a3);
impl_generic_fn!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_generic_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_generic_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_generic_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_generic_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

/// A [`Udf`] produced by the generic adapter.
pub struct GenericUdf<F, M> {
    func: F,
    parameters: Vec<ParamShape>,
    returns: Shape,
    arity: Arity,
    _marker: PhantomData<fn() -> M>,
}

impl<F, M> GenericUdf<F, M> {
    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn parameters(&self) -> &[ParamShape] {
        &self.parameters
    }

    pub fn returns(&self) -> &Shape {
        &self.returns
    }
}

impl<F, M> fmt::Debug for GenericUdf<F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericUdf")
            .field("parameters", &self.parameters)
            .field("returns", &self.returns)
            .field("arity", &self.arity)
            .finish()
    }
}

impl<F, M> Udf for GenericUdf<F, M>
where
    F: GenericFn<M>,
{
    fn call(&self, ctx: &Context, args: &[Value]) -> UdfResult<Value> {
        self.func.invoke(ctx, args)
    }

    fn accept(&self, arity: usize) -> bool {
        self.arity.accepts(arity)
    }

    fn is_aggregation_parameter(&self, _k: usize) -> bool {
        false
    }
}

/// Wraps `func` into a [`Udf`].
///
/// Fails with [`UdfError::Adaptation`] when a parameter or the return type
/// has a shape that cannot be converted unambiguously, when the function
/// returns nothing, or when a [`Rest`] parameter is not last.
pub fn convert_generic<F, M>(func: F) -> UdfResult<GenericUdf<F, M>>
where
    F: GenericFn<M>,
{
    let parameters = F::parameters();
    let returns = F::returns();
    let arity = inspect(&parameters, &returns).inspect_err(|e| {
        debug!(
            function = std::any::type_name::<F>(),
            error = %e,
            "rejected generic function"
        );
    })?;

    debug!(
        function = std::any::type_name::<F>(),
        %arity,
        returns = %returns,
        "adapted generic function"
    );

    Ok(GenericUdf {
        func,
        parameters,
        returns,
        arity,
        _marker: PhantomData,
    })
}

/// Like [`convert_generic`] for functions taking `&Context` first.
///
/// The context does not count towards the arity.
pub fn convert_generic_with_context<F, T>(func: F) -> UdfResult<GenericUdf<F, WithContext<T>>>
where
    F: GenericFn<WithContext<T>>,
{
    convert_generic(func)
}

/// Like [`convert_generic`] but panics on failure.
///
/// For static initialization, where a malformed function is a programming
/// error and recovery is not meaningful.
pub fn must_convert_generic<F, M>(func: F) -> GenericUdf<F, M>
where
    F: GenericFn<M>,
{
    match convert_generic(func) {
        Ok(udf) => udf,
        Err(e) => panic!("{}", e),
    }
}

fn inspect(parameters: &[ParamShape], returns: &Shape) -> UdfResult<Arity> {
    for (position, param) in parameters.iter().enumerate() {
        if matches!(param, ParamShape::Variadic(_)) && position + 1 != parameters.len() {
            return Err(UdfError::Adaptation(format!(
                "variadic parameter {} must be the last parameter",
                position
            )));
        }
        param
            .shape()
            .validate()
            .map_err(|reason| UdfError::Adaptation(format!("parameter {}: {}", position, reason)))?;
    }

    if *returns == Shape::Unit {
        return Err(UdfError::Adaptation("function must return a value".to_string()));
    }
    returns
        .validate()
        .map_err(|reason| UdfError::Adaptation(format!("return value: {}", reason)))?;

    Ok(match parameters.last() {
        Some(ParamShape::Variadic(_)) => Arity::AtLeast(parameters.len() - 1),
        _ => Arity::Exact(parameters.len()),
    })
}
