//! Per-invocation execution context.
//!
//! The embedding engine creates one [`Context`] per logical invocation (one
//! tuple, one statement evaluation) and passes it by reference through every
//! nested call. Nothing in the dispatch core depends on its contents; it is an
//! extension point for the engine (deadlines, cancellation flags, diagnostic
//! sinks) plus a `tracing` span that attributes log output to the invocation.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::Span;

static NEXT_INVOCATION: AtomicU64 = AtomicU64::new(1);

/// Execution state threaded through every call.
///
/// A `Context` is `Sync`, so a callable that fans work out to other threads
/// may share it by reference for the duration of the call. Callables must not
/// retain it afterwards.
///
/// ```
/// use clove_udf::Context;
///
/// struct Deadline(u64);
///
/// let ctx = Context::new().with_extension(Deadline(250));
/// assert_eq!(ctx.extension::<Deadline>().map(|d| d.0), Some(250));
/// assert!(ctx.extension::<String>().is_none());
/// ```
pub struct Context {
    id: u64,
    span: Span,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new() -> Self {
        let id = NEXT_INVOCATION.fetch_add(1, Ordering::Relaxed);
        Context {
            id,
            span: tracing::debug_span!("udf_invocation", invocation = id),
            extensions: HashMap::new(),
        }
    }

    /// Process-unique identifier of this invocation
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Attaches engine-defined state, replacing any previous value of the same type.
    pub fn with_extension<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
        self
    }

    pub fn extension<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|ext| ext.downcast_ref::<T>())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}
