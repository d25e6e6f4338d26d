//! Dispatch runtime for user-defined functions.
//!
//! A host query engine resolves functions by name and argument count through a
//! [`Registry`], checks [`Udf::accept`] and [`Udf::is_aggregation_parameter`]
//! while planning, and invokes [`Udf::call`] with a per-invocation [`Context`]
//! and dynamically typed [`Value`] arguments. Plain Rust functions become
//! [`Udf`]s through the [`generic`] adapter.

pub mod builtins;
pub mod context;
pub mod error;
pub mod generic;
pub mod json;
pub mod output;
pub mod registry;
pub mod udf;
pub mod value;

pub use context::Context;
pub use error::{BoxError, ConversionError, UdfError, UdfResult};
pub use generic::{Rest, convert_generic, convert_generic_with_context, must_convert_generic};
pub use json::{from_json, to_json_value};
pub use output::{to_json, to_json_pretty};
pub use registry::{Registry, RegistryConfig};
pub use udf::{Arity, Udf};
pub use value::{Tag, Value};
