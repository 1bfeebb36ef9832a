//! Method registry.
//!
//! Maps method names to handlers. The registry is the only long-lived
//! mutable state of the engine and is shared read-mostly between
//! concurrent dispatches; every entry is inserted or replaced atomically
//! under a write lock.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::types::RESERVED_METHOD_PREFIX;

/// Uniform handler capability: params in, result value out.
///
/// Implemented for every `Fn(Option<Value>) -> Result<Value, Error>`
/// closure. Typed handlers are produced by [`typed::no_params`] and
/// [`typed::unary`].
///
/// [`typed::no_params`]: crate::typed::no_params
/// [`typed::unary`]: crate::typed::unary
pub trait MethodHandler: Send + Sync {
    fn handle(&self, params: Option<Value>) -> Result<Value, Error>;
}

impl<F> MethodHandler for F
where
    F: Fn(Option<Value>) -> Result<Value, Error> + Send + Sync,
{
    fn handle(&self, params: Option<Value>) -> Result<Value, Error> {
        self(params)
    }
}

/// Shared handle to a registered handler.
pub type BoxedHandler = Arc<dyn MethodHandler>;

/// What happens when a method name is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// The second registration fails with [`Error::AlreadyRegistered`].
    #[default]
    Reject,
    /// The second registration silently overwrites the first.
    Replace,
}

/// Thread-safe registry of JSON-RPC methods.
pub struct MethodRegistry {
    handlers: RwLock<HashMap<String, BoxedHandler>>,
    conflict_policy: ConflictPolicy,
}

impl MethodRegistry {
    /// Create an empty registry that rejects duplicate registrations.
    pub fn new() -> Self {
        Self::with_conflict_policy(ConflictPolicy::Reject)
    }

    /// Create an empty registry with the given conflict policy.
    pub fn with_conflict_policy(conflict_policy: ConflictPolicy) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            conflict_policy,
        }
    }

    /// The policy applied to duplicate registrations.
    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    /// Register a handler under `method`.
    ///
    /// Blank names and names starting with `rpc.` are always rejected,
    /// whatever the conflict policy.
    pub fn register<H>(&self, method: &str, handler: H) -> Result<(), Error>
    where
        H: MethodHandler + 'static,
    {
        self.register_boxed(method, Arc::new(handler))
    }

    /// Register an already shared handler.
    pub fn register_boxed(&self, method: &str, handler: BoxedHandler) -> Result<(), Error> {
        if method.trim().is_empty() {
            return Err(Error::invalid_argument("method must not be blank"));
        }
        if method.starts_with(RESERVED_METHOD_PREFIX) {
            return Err(Error::invalid_argument(format!(
                "methods starting with {} are reserved",
                RESERVED_METHOD_PREFIX
            )));
        }

        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if self.conflict_policy == ConflictPolicy::Reject && handlers.contains_key(method) {
            return Err(Error::AlreadyRegistered(method.to_string()));
        }

        let replaced = handlers.insert(method.to_string(), handler).is_some();
        debug!(method, replaced, "Registered method");
        Ok(())
    }

    /// Look up the handler for `method`.
    pub fn find(&self, method: &str) -> Option<BoxedHandler> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .cloned()
    }

    /// Whether `method` is registered.
    pub fn contains(&self, method: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no method is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.method_names())
            .field("conflict_policy", &self.conflict_policy)
            .finish()
    }
}
