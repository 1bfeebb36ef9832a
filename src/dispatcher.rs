//! The dispatch engine.
//!
//! `Dispatcher` accepts a decoded JSON payload, decides between single and
//! batch mode, and drives every entry through parse, validate, route and
//! invoke. Every failure is caught at the entry boundary and turned into an
//! error response; nothing a handler or interceptor does can make `dispatch`
//! itself fail.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::DispatcherConfig;
use crate::error::Error;
use crate::interceptor::{Interceptor, MethodAccessInterceptor};
use crate::notification::{
    DirectNotificationExecutor, NotificationExecutor, ThreadPoolNotificationExecutor,
};
use crate::parser::parse_request;
use crate::registry::{MethodHandler, MethodRegistry};
use crate::resolver::{DefaultExceptionResolver, ExceptionResolver};
use crate::typed;
use crate::types::{DispatchResult, ErrorCode, ErrorObject, Request, RequestId, Response};
use crate::validator::validate_request;

type Interceptors = Arc<Vec<Arc<dyn Interceptor>>>;

fn fault(code: ErrorCode) -> Error {
    Error::rpc(code.code(), code.message())
}

/// Run a stage, turning a panic into an internal error.
fn guard<T>(stage: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    panic::catch_unwind(AssertUnwindSafe(stage))
        .unwrap_or_else(|_| Err(Error::internal("dispatch stage panicked")))
}

/// Tell every interceptor about a failure. Their own failures are dropped.
fn notify_error(
    interceptors: &[Arc<dyn Interceptor>],
    request: Option<&Request>,
    error: &Error,
    mapped: &ErrorObject,
) {
    for interceptor in interceptors {
        match panic::catch_unwind(AssertUnwindSafe(|| {
            interceptor.on_error(request, error, mapped)
        })) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "on_error interceptor failed"),
            Err(_) => warn!("on_error interceptor panicked"),
        }
    }
}

/// `before_invoke` hooks, the handler, then `after_invoke` hooks.
fn invoke(
    interceptors: &[Arc<dyn Interceptor>],
    handler: &dyn MethodHandler,
    request: &Request,
) -> Result<Value, Error> {
    for interceptor in interceptors {
        guard(|| interceptor.before_invoke(request))?;
    }
    let result = guard(|| handler.handle(request.params().cloned()))?;
    for interceptor in interceptors {
        guard(|| interceptor.after_invoke(request, &result))?;
    }
    Ok(result)
}

/// JSON-RPC 2.0 dispatch engine.
///
/// # Example
///
/// ```
/// use jsonrpc_dispatch::Dispatcher;
/// use serde_json::json;
///
/// let dispatcher = Dispatcher::new();
/// dispatcher.register_no_params("ping", || Ok("pong"))?;
///
/// let result = dispatcher.dispatch(&json!({"jsonrpc": "2.0", "method": "ping", "id": 1}));
/// let response = result.single_response().unwrap();
/// assert_eq!(response.result(), Some(&json!("pong")));
/// # Ok::<(), jsonrpc_dispatch::Error>(())
/// ```
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
    resolver: Arc<dyn ExceptionResolver>,
    notification_executor: Arc<dyn NotificationExecutor>,
    interceptors: Interceptors,
    max_batch_size: usize,
    max_request_bytes: usize,
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration.
    pub fn new() -> Self {
        let config = DispatcherConfig::default();
        Self {
            registry: Arc::new(MethodRegistry::with_conflict_policy(
                config.method_registration_conflict_policy,
            )),
            resolver: Arc::new(DefaultExceptionResolver::new(config.include_error_data)),
            notification_executor: Arc::new(DirectNotificationExecutor),
            interceptors: Arc::new(Vec::new()),
            max_batch_size: config.max_batch_size,
            max_request_bytes: config.max_request_bytes,
        }
    }

    /// Start building a configured dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// The registry handlers are looked up in.
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Largest batch accepted before rejecting it whole.
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Body size limit transports enforce before decoding.
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    /// Register a raw handler.
    pub fn register<H>(&self, method: &str, handler: H) -> Result<(), Error>
    where
        H: MethodHandler + 'static,
    {
        self.registry.register(method, handler)
    }

    /// Register a function that takes no parameters.
    pub fn register_no_params<F, R>(&self, method: &str, f: F) -> Result<(), Error>
    where
        F: Fn() -> Result<R, Error> + Send + Sync + 'static,
        R: Serialize + 'static,
    {
        self.registry.register(method, typed::no_params(f))
    }

    /// Register a function whose params deserialize into `P`.
    pub fn register_unary<F, P, R>(&self, method: &str, f: F) -> Result<(), Error>
    where
        F: Fn(P) -> Result<R, Error> + Send + Sync + 'static,
        P: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        self.registry.register(method, typed::unary(f))
    }

    /// The response a transport sends when the body is not valid JSON.
    pub fn parse_error_response() -> Response {
        Response::error(RequestId::Null, ErrorObject::parse_error())
    }

    /// The response a transport sends when the body exceeds
    /// [`Self::max_request_bytes`].
    pub fn payload_too_large_response() -> Response {
        Response::error(
            RequestId::Null,
            ErrorObject::new(
                ErrorCode::InvalidRequest.code(),
                "Request payload too large",
                None,
            ),
        )
    }

    /// Dispatch a decoded payload.
    pub fn dispatch(&self, payload: &Value) -> DispatchResult {
        self.dispatch_optional(Some(payload))
    }

    /// Dispatch a payload that may be missing altogether.
    ///
    /// A missing payload yields a single INVALID_REQUEST response.
    pub fn dispatch_optional(&self, payload: Option<&Value>) -> DispatchResult {
        let Some(payload) = payload else {
            let response = self.fail(None, RequestId::Null, fault(ErrorCode::InvalidRequest));
            return DispatchResult::single(Some(response));
        };

        let Some(entries) = payload.as_array() else {
            return DispatchResult::single(self.dispatch_entry(payload));
        };

        if entries.is_empty() {
            debug!("Rejecting empty batch");
            let response = self.fail(None, RequestId::Null, fault(ErrorCode::InvalidRequest));
            return DispatchResult::single(Some(response));
        }

        if entries.len() > self.max_batch_size {
            debug!(
                size = entries.len(),
                max = self.max_batch_size,
                "Rejecting oversized batch"
            );
            let error = Error::rpc(
                ErrorCode::InvalidRequest.code(),
                "Batch size exceeds configured maximum",
            );
            return DispatchResult::single(Some(self.fail(None, RequestId::Null, error)));
        }

        debug!(size = entries.len(), "Dispatching batch");
        let responses = entries
            .iter()
            .filter_map(|entry| self.dispatch_entry(entry))
            .collect();
        DispatchResult::batch(responses)
    }

    /// Dispatch an already built request.
    ///
    /// Returns `None` for notifications.
    pub fn dispatch_request(&self, request: Request) -> Option<Response> {
        if let Err(error) = validate_request(&request) {
            let id = request.request_id();
            return Some(self.fail(Some(&request), id, error));
        }
        self.route(request)
    }

    fn dispatch_entry(&self, raw: &Value) -> Option<Response> {
        if !raw.is_object() {
            return Some(self.fail(None, RequestId::Null, fault(ErrorCode::InvalidRequest)));
        }

        let error_id = RequestId::best_effort(raw.get("id"));

        let parsed = self
            .interceptors
            .iter()
            .try_for_each(|interceptor| guard(|| interceptor.before_validate(raw)))
            .and_then(|()| parse_request(raw));
        let request = match parsed {
            Ok(request) => request,
            Err(error) => return Some(self.fail(None, error_id, error)),
        };

        if let Err(error) = validate_request(&request) {
            return Some(self.fail(Some(&request), error_id, error));
        }

        self.route(request)
    }

    fn route(&self, request: Request) -> Option<Response> {
        let method = request.method().unwrap_or_default().to_string();
        let id = request.request_id();
        debug!(method = %method, %id, notification = request.is_notification(), "Dispatching request");

        let Some(handler) = self.registry.find(&method) else {
            debug!(method = %method, "Method not found");
            return self.fail_request(&request, id, fault(ErrorCode::MethodNotFound));
        };

        if request.is_notification() {
            let interceptors = Arc::clone(&self.interceptors);
            let resolver = Arc::clone(&self.resolver);
            let task = Box::new(move || {
                if let Err(error) = invoke(&interceptors, &*handler, &request) {
                    let mapped = resolver.resolve(&error);
                    notify_error(&interceptors, Some(&request), &error, &mapped);
                }
            });
            if let Err(e) = self.notification_executor.execute(task) {
                warn!(method = %method, error = %e, "Failed to submit notification");
            }
            return None;
        }

        match invoke(&self.interceptors, &*handler, &request) {
            Ok(result) => Some(Response::success(id, result)),
            Err(error) => Some(self.fail(Some(&request), id, error)),
        }
    }

    /// Like [`Self::fail`], but notifications only report to interceptors.
    fn fail_request(&self, request: &Request, id: RequestId, error: Error) -> Option<Response> {
        let response = self.fail(Some(request), id, error);
        if request.is_notification() {
            return None;
        }
        Some(response)
    }

    fn fail(&self, request: Option<&Request>, id: RequestId, error: Error) -> Response {
        let mapped = self.resolver.resolve(&error);
        notify_error(&self.interceptors, request, &error, &mapped);
        Response::error(id, mapped)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("interceptors", &self.interceptors.len())
            .field("max_batch_size", &self.max_batch_size)
            .field("max_request_bytes", &self.max_request_bytes)
            .finish()
    }
}

/// Builder for [`Dispatcher`].
///
/// Collaborators not supplied explicitly are derived from the
/// [`DispatcherConfig`]. When the config carries an allowlist or denylist, a
/// [`MethodAccessInterceptor`] is installed ahead of any other interceptor.
#[derive(Default)]
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    registry: Option<Arc<MethodRegistry>>,
    resolver: Option<Arc<dyn ExceptionResolver>>,
    notification_executor: Option<Arc<dyn NotificationExecutor>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl DispatcherBuilder {
    /// Use this configuration.
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing registry. Its own conflict policy applies.
    pub fn registry(mut self, registry: Arc<MethodRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the default exception resolver.
    pub fn exception_resolver<R>(mut self, resolver: R) -> Self
    where
        R: ExceptionResolver + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Replace the executor derived from the configuration.
    pub fn notification_executor<E>(mut self, executor: E) -> Self
    where
        E: NotificationExecutor + 'static,
    {
        self.notification_executor = Some(Arc::new(executor));
        self
    }

    /// Append an interceptor. Interceptors run in the order they are added.
    pub fn interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: Interceptor + 'static,
    {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Validate the configuration and assemble the dispatcher.
    pub fn build(self) -> Result<Dispatcher, Error> {
        let config = self.config;
        config.validate()?;

        let registry = self.registry.unwrap_or_else(|| {
            Arc::new(MethodRegistry::with_conflict_policy(
                config.method_registration_conflict_policy,
            ))
        });

        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(DefaultExceptionResolver::new(config.include_error_data)));

        let notification_executor: Arc<dyn NotificationExecutor> =
            match self.notification_executor {
                Some(executor) => executor,
                None if config.notification_executor_enabled => Arc::new(
                    ThreadPoolNotificationExecutor::new(config.notification_worker_threads)?,
                ),
                None => Arc::new(DirectNotificationExecutor),
            };

        let mut interceptors: Vec<Arc<dyn Interceptor>> = Vec::new();
        if config.has_access_rules() {
            interceptors.push(Arc::new(MethodAccessInterceptor::new(
                config.method_allowlist.iter().cloned(),
                config.method_denylist.iter().cloned(),
            )));
        }
        interceptors.extend(self.interceptors);

        Ok(Dispatcher {
            registry,
            resolver,
            notification_executor,
            interceptors: Arc::new(interceptors),
            max_batch_size: config.max_batch_size,
            max_request_bytes: config.max_request_bytes,
        })
    }
}
