//! Typed method handlers.
//!
//! Adapts strongly-typed functions into the uniform [`MethodHandler`]
//! capability. Parameters are bound with `serde_json::from_value` and results
//! written with `serde_json::to_value`. A binding failure is always reported
//! as INVALID_PARAMS, never as an internal error.
//!
//! ```
//! use jsonrpc_dispatch::{Error, MethodRegistry, typed};
//!
//! let registry = MethodRegistry::new();
//! registry.register("add", typed::unary(|(a, b): (i64, i64)| Ok(a + b)))?;
//! registry.register("version", typed::no_params(|| Ok("1.0")))?;
//! # Ok::<(), Error>(())
//! ```

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::registry::MethodHandler;
use crate::types::ErrorCode;

fn invalid_params() -> Error {
    Error::invalid_argument(ErrorCode::InvalidParams.message())
}

/// Bind raw params into `T`.
///
/// Absent params bind as JSON `null`, so `Option<_>` and `()` targets yield
/// `None`/`()` instead of failing. Binding into [`Value`] is the identity.
pub fn bind_params<T>(params: Option<Value>) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    serde_json::from_value(params.unwrap_or(Value::Null)).map_err(|e| {
        debug!(error = %e, "Failed to bind params");
        invalid_params()
    })
}

/// Serialize a handler result into a JSON value.
pub fn write_result<R>(result: R) -> Result<Value, Error>
where
    R: Serialize,
{
    Ok(serde_json::to_value(result)?)
}

/// Absent, `null`, `[]` and `{}` all count as "no params".
fn is_empty_params(params: Option<&Value>) -> bool {
    match params {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(members)) => members.is_empty(),
        Some(_) => false,
    }
}

struct NoParamsHandler<F, R> {
    f: F,
    _phantom: PhantomData<fn() -> R>,
}

impl<F, R> MethodHandler for NoParamsHandler<F, R>
where
    F: Fn() -> Result<R, Error> + Send + Sync,
    R: Serialize,
{
    fn handle(&self, params: Option<Value>) -> Result<Value, Error> {
        if !is_empty_params(params.as_ref()) {
            return Err(invalid_params());
        }
        write_result((self.f)()?)
    }
}

struct UnaryHandler<F, P, R> {
    f: F,
    _phantom: PhantomData<fn(P) -> R>,
}

impl<F, P, R> MethodHandler for UnaryHandler<F, P, R>
where
    F: Fn(P) -> Result<R, Error> + Send + Sync,
    P: DeserializeOwned,
    R: Serialize,
{
    fn handle(&self, params: Option<Value>) -> Result<Value, Error> {
        let bound: P = bind_params(params)?;
        write_result((self.f)(bound)?)
    }
}

/// Handler for a function taking no parameters.
///
/// Any params other than absent, `null`, `[]` or `{}` fail with
/// INVALID_PARAMS.
pub fn no_params<F, R>(f: F) -> impl MethodHandler + 'static
where
    F: Fn() -> Result<R, Error> + Send + Sync + 'static,
    R: Serialize + 'static,
{
    NoParamsHandler {
        f,
        _phantom: PhantomData,
    }
}

/// Handler for a function taking a single parameter of type `P`.
pub fn unary<F, P, R>(f: F) -> impl MethodHandler + 'static
where
    F: Fn(P) -> Result<R, Error> + Send + Sync + 'static,
    P: DeserializeOwned + 'static,
    R: Serialize + 'static,
{
    UnaryHandler {
        f,
        _phantom: PhantomData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Greeting {
        name: String,
    }

    fn is_invalid_params(err: &Error) -> bool {
        matches!(err, Error::InvalidArgument(message) if message == "Invalid params")
    }

    #[test]
    fn no_params_accepts_empty_shapes() {
        let handler = no_params(|| Ok("pong"));
        for params in [None, Some(json!(null)), Some(json!([])), Some(json!({}))] {
            assert_eq!(handler.handle(params).unwrap(), json!("pong"));
        }
    }

    #[test]
    fn no_params_rejects_anything_else() {
        let handler = no_params(|| Ok("pong"));
        for params in [json!([1]), json!({"a": 1}), json!(5)] {
            let err = handler.handle(Some(params)).unwrap_err();
            assert!(is_invalid_params(&err));
        }
    }

    #[test]
    fn unary_binds_structs() {
        let handler = unary(|greeting: Greeting| Ok(format!("Hello, {}!", greeting.name)));
        assert_eq!(
            handler.handle(Some(json!({"name": "world"}))).unwrap(),
            json!("Hello, world!")
        );
    }

    #[test]
    fn unary_binds_positional_tuples() {
        let handler = unary(|(a, b): (i32, i32)| Ok(a + b));
        assert_eq!(handler.handle(Some(json!([2, 3]))).unwrap(), json!(5));
    }

    #[test]
    fn binding_failure_is_invalid_params() {
        let handler = unary(|greeting: Greeting| Ok(greeting.name));
        let err = handler.handle(Some(json!({"name": 42}))).unwrap_err();
        assert!(is_invalid_params(&err));

        let err = handler.handle(None).unwrap_err();
        assert!(is_invalid_params(&err));
    }

    #[test]
    fn value_target_is_identity() {
        let handler = unary(|params: Value| Ok(params));
        let payload = json!({"nested": [1, {"deep": true}]});
        assert_eq!(handler.handle(Some(payload.clone())).unwrap(), payload);
    }

    #[test]
    fn absent_params_bind_to_none_for_optional_targets() {
        let bound: Option<Greeting> = bind_params(None).unwrap();
        assert_eq!(bound, None);
        let bound: Value = bind_params(None).unwrap();
        assert_eq!(bound, Value::Null);
    }

    #[test]
    fn handler_errors_pass_through() {
        let handler = unary(|_: Value| -> Result<Value, Error> {
            Err(Error::rpc(-32001, "domain"))
        });
        let err = handler.handle(Some(json!([]))).unwrap_err();
        assert!(matches!(err, Error::RpcError { code: -32001, .. }));
    }
}
