//! Request parsing.
//!
//! Converts a raw JSON value into a [`Request`]. The parser only checks that
//! it was handed an object; every other rule is left to the validator so that
//! malformed but decodable requests still get a proper protocol error.

use serde_json::Value;
use tracing::trace;

use crate::error::Error;
use crate::types::{ErrorCode, Request};

/// Parse a single request object.
///
/// Wrong-typed `jsonrpc` and `method` members are read as absent. The `id`
/// member is kept verbatim, including an explicit `null`, so notification
/// detection depends on key presence only.
pub fn parse_request(value: &Value) -> Result<Request, Error> {
    let object = value.as_object().ok_or_else(|| {
        Error::rpc(
            ErrorCode::InvalidRequest.code(),
            ErrorCode::InvalidRequest.message(),
        )
    })?;

    let jsonrpc = object
        .get("jsonrpc")
        .and_then(Value::as_str)
        .map(str::to_string);
    let method = object
        .get("method")
        .and_then(Value::as_str)
        .map(str::to_string);
    let id = object.get("id").cloned();
    let params = object.get("params").cloned();

    trace!(?jsonrpc, ?method, id_present = id.is_some(), "Parsed request");

    Ok(Request::from_parts(jsonrpc, id, method, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invalid_request_code(err: Error) -> i32 {
        match err {
            Error::RpcError { code, .. } => code,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_objects() {
        for value in [json!(null), json!(1), json!("x"), json!([])] {
            let err = parse_request(&value).unwrap_err();
            assert_eq!(invalid_request_code(err), -32600);
        }
    }

    #[test]
    fn wrong_typed_members_become_absent() {
        let request = parse_request(&json!({"jsonrpc": 2.0, "method": 7, "id": 1})).unwrap();
        assert_eq!(request.jsonrpc(), None);
        assert_eq!(request.method(), None);
        assert_eq!(request.id(), Some(&json!(1)));
    }

    #[test]
    fn explicit_null_id_is_present() {
        let request = parse_request(&json!({"jsonrpc": "2.0", "method": "ping", "id": null}))
            .unwrap();
        assert!(request.id_present());
        assert!(!request.is_notification());
    }

    #[test]
    fn missing_id_is_notification() {
        let request = parse_request(&json!({"jsonrpc": "2.0", "method": "ping"})).unwrap();
        assert!(!request.id_present());
        assert!(request.is_notification());
    }

    #[test]
    fn params_are_kept_verbatim() {
        let request =
            parse_request(&json!({"jsonrpc": "2.0", "method": "m", "params": 5, "id": 1}))
                .unwrap();
        assert_eq!(request.params(), Some(&json!(5)));
    }
}
