//! Request validation.

use serde_json::Value;

use crate::error::Error;
use crate::types::{ErrorCode, JSONRPC_VERSION, Request};

fn fault(code: ErrorCode) -> Error {
    Error::rpc(code.code(), code.message())
}

/// Check protocol-level invariants of a parsed request.
///
/// Method existence is not checked here; unknown methods are reported at
/// routing time. Explicit `"params": null` counts as present and is rejected
/// like any other primitive.
pub fn validate_request(request: &Request) -> Result<(), Error> {
    if request.jsonrpc() != Some(JSONRPC_VERSION) {
        return Err(fault(ErrorCode::InvalidRequest));
    }

    match request.method() {
        Some(method) if !method.trim().is_empty() => {}
        _ => return Err(fault(ErrorCode::InvalidRequest)),
    }

    if let Some(id) = request.id()
        && !matches!(id, Value::Null | Value::String(_) | Value::Number(_))
    {
        return Err(fault(ErrorCode::InvalidRequest));
    }

    if let Some(params) = request.params()
        && !params.is_array()
        && !params.is_object()
    {
        return Err(fault(ErrorCode::InvalidParams));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_request;
    use serde_json::json;

    fn check(value: Value) -> Result<(), i32> {
        let request = parse_request(&value).unwrap();
        validate_request(&request).map_err(|err| match err {
            Error::RpcError { code, .. } => code,
            other => panic!("unexpected error: {other:?}"),
        })
    }

    #[test]
    fn accepts_well_formed_requests() {
        assert_eq!(check(json!({"jsonrpc": "2.0", "method": "ping", "id": 1})), Ok(()));
        assert_eq!(check(json!({"jsonrpc": "2.0", "method": "ping", "id": "a"})), Ok(()));
        assert_eq!(check(json!({"jsonrpc": "2.0", "method": "ping", "id": null})), Ok(()));
        assert_eq!(
            check(json!({"jsonrpc": "2.0", "method": "ping", "params": [1], "id": 1})),
            Ok(())
        );
        assert_eq!(
            check(json!({"jsonrpc": "2.0", "method": "ping", "params": {"a": 1}})),
            Ok(())
        );
    }

    #[test]
    fn rejects_wrong_version() {
        assert_eq!(check(json!({"jsonrpc": "1.0", "method": "ping", "id": 1})), Err(-32600));
        assert_eq!(check(json!({"method": "ping", "id": 1})), Err(-32600));
    }

    #[test]
    fn rejects_missing_or_blank_method() {
        assert_eq!(check(json!({"jsonrpc": "2.0", "id": 1})), Err(-32600));
        assert_eq!(check(json!({"jsonrpc": "2.0", "method": "  ", "id": 1})), Err(-32600));
        assert_eq!(check(json!({"jsonrpc": "2.0", "method": 1, "id": 1})), Err(-32600));
    }

    #[test]
    fn rejects_structured_ids() {
        assert_eq!(
            check(json!({"jsonrpc": "2.0", "method": "ping", "id": {"x": 1}})),
            Err(-32600)
        );
        assert_eq!(
            check(json!({"jsonrpc": "2.0", "method": "ping", "id": true})),
            Err(-32600)
        );
    }

    #[test]
    fn rejects_primitive_params() {
        assert_eq!(
            check(json!({"jsonrpc": "2.0", "method": "ping", "params": 5, "id": 1})),
            Err(-32602)
        );
        assert_eq!(
            check(json!({"jsonrpc": "2.0", "method": "ping", "params": null, "id": 1})),
            Err(-32602)
        );
    }

    #[test]
    fn notifications_pass_regardless_of_method_existence() {
        assert_eq!(check(json!({"jsonrpc": "2.0", "method": "nobody-home"})), Ok(()));
    }
}
