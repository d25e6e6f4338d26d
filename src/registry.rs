//! Name-keyed table of user-defined functions.
//!
//! The embedding engine owns one [`Registry`], fills it during start-up
//! (usually via [`crate::builtins::install`] plus its own plugins) and then
//! shares it with every worker. Lookups take a read lock only, so concurrent
//! dispatch never contends unless someone registers at the same time.
//!
//! # Conflict policy
//!
//! A name binds exactly one function. Registering a second function under a
//! name that is already bound fails with
//! [`UdfError::DuplicateRegistration`], whatever arities the two accept. A
//! function that should serve several call shapes accepts all of them itself
//! (see [`crate::builtins::Join`]).

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::{
    context::Context,
    error::{UdfError, UdfResult},
    udf::Udf,
    value::Value,
};

/// Identifier grammar of the query language.
pub const DEFAULT_NAME_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*$";

static DEFAULT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_NAME_PATTERN).expect("default name pattern is valid"));

/// Registry settings.
///
/// ```
/// use clove_udf::{Registry, RegistryConfig};
///
/// let config: RegistryConfig = serde_json::from_str(r#"{ "case_sensitive": true }"#).unwrap();
/// let registry = Registry::with_config(config).unwrap();
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// When false, names are folded to lower case on registration and lookup
    pub case_sensitive: bool,

    /// Regular expression every registered name must match in full
    pub name_pattern: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            case_sensitive: false,
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
        }
    }
}

pub struct Registry {
    case_sensitive: bool,
    name_pattern: Regex,
    functions: RwLock<HashMap<String, Arc<dyn Udf>>>,
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Registry {
            case_sensitive: false,
            name_pattern: DEFAULT_NAME_REGEX.clone(),
            functions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_config(config: RegistryConfig) -> UdfResult<Self> {
        // Names must match in full, even when the configured pattern is unanchored
        let name_pattern = Regex::new(&format!("^(?:{})$", config.name_pattern)).map_err(|e| {
            UdfError::InvalidConfig(format!("name_pattern '{}': {}", config.name_pattern, e))
        })?;
        Ok(Registry {
            case_sensitive: config.case_sensitive,
            name_pattern,
            functions: RwLock::new(HashMap::new()),
        })
    }

    /// Registers `udf` under `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clove_udf::generic::convert_generic;
    /// use clove_udf::{Context, Registry, Udf, UdfError, Value};
    ///
    /// fn inc(v: i64) -> i64 {
    ///     v + 1
    /// }
    ///
    /// let registry = Registry::new();
    /// registry.register("inc", convert_generic(inc).unwrap()).unwrap();
    ///
    /// let udf = registry.lookup("INC", 1).unwrap();
    /// assert_eq!(udf.call(&Context::new(), &[Value::Integer(1)]).unwrap(), Value::Integer(2));
    ///
    /// assert!(matches!(
    ///     registry.register("inc", convert_generic(inc).unwrap()),
    ///     Err(UdfError::DuplicateRegistration(_))
    /// ));
    /// ```
    pub fn register(&self, name: &str, udf: impl Udf + 'static) -> UdfResult<()> {
        self.register_shared(name, Arc::new(udf))
    }

    /// Registers an already shared function, e.g. one instance under several names.
    pub fn register_shared(&self, name: &str, udf: Arc<dyn Udf>) -> UdfResult<()> {
        let key = self.key(name)?;
        let mut functions = self.functions.write();
        if functions.contains_key(&key) {
            debug!(function = %key, "rejected duplicate registration");
            return Err(UdfError::DuplicateRegistration(key));
        }
        functions.insert(key.clone(), udf);
        info!(function = %key, "registered function");
        Ok(())
    }

    /// Registers `udf` or panics.
    ///
    /// Meant for one-time start-up registration, where a conflict is a
    /// programming error.
    pub fn must_register(&self, name: &str, udf: impl Udf + 'static) {
        if let Err(e) = self.register(name, udf) {
            panic!("cannot register function '{}': {}", name, e);
        }
    }

    /// Removes the function bound to `name`.
    pub fn unregister(&self, name: &str) -> UdfResult<()> {
        let key = self.normalize(name);
        match self.functions.write().remove(&key) {
            Some(_) => {
                info!(function = %key, "unregistered function");
                Ok(())
            }
            None => Err(UdfError::NotFound(key)),
        }
    }

    /// Finds the function bound to `name` that accepts `arity` arguments.
    pub fn lookup(&self, name: &str, arity: usize) -> UdfResult<Arc<dyn Udf>> {
        let key = self.normalize(name);
        let udf = self
            .functions
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| UdfError::NotFound(key.clone()))?;

        if !udf.accept(arity) {
            debug!(function = %key, arity, "arity not accepted");
            return Err(UdfError::ArityNotAccepted { name: key, arity });
        }
        Ok(udf)
    }

    /// Aggregation flag of every argument position for a call with `arity`
    /// arguments.
    pub fn aggregation_parameters(&self, name: &str, arity: usize) -> UdfResult<Vec<bool>> {
        let udf = self.lookup(name, arity)?;
        Ok((0..arity).map(|k| udf.is_aggregation_parameter(k)).collect())
    }

    /// Looks up `name` for `args.len()` arguments and calls it inside the
    /// context's span.
    pub fn call(&self, ctx: &Context, name: &str, args: &[Value]) -> UdfResult<Value> {
        let _entered = ctx.span().enter();
        let udf = self.lookup(name, args.len())?;
        trace!(function = name, arity = args.len(), "dispatching call");
        udf.call(ctx, args)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.read().contains_key(&self.normalize(name))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.read().is_empty()
    }

    fn key(&self, name: &str) -> UdfResult<String> {
        if name.is_empty() || !self.name_pattern.is_match(name) {
            return Err(UdfError::InvalidName(name.to_string()));
        }
        Ok(self.normalize(name))
    }

    fn normalize(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
