//! Interceptor pipeline hooks.
//!
//! Interceptors observe every dispatch entry at four points. They run in
//! registration order. A failing `before_validate`, `before_invoke` or
//! `after_invoke` aborts the entry and its error is resolved like any other
//! failure. `on_error` failures are swallowed and never change the response.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::Error;
use crate::types::{ErrorCode, ErrorObject, Request};

/// Cross-cutting hooks around dispatch. Every hook defaults to a no-op.
pub trait Interceptor: Send + Sync {
    /// Called with the raw entry before parsing and validation.
    fn before_validate(&self, raw: &Value) -> Result<(), Error> {
        let _ = raw;
        Ok(())
    }

    /// Called after routing succeeded, right before the handler runs.
    fn before_invoke(&self, request: &Request) -> Result<(), Error> {
        let _ = request;
        Ok(())
    }

    /// Called with the handler result.
    fn after_invoke(&self, request: &Request, result: &Value) -> Result<(), Error> {
        let _ = (request, result);
        Ok(())
    }

    /// Called for every failure with the original error and the error object
    /// that will be (or, for notifications, would have been) returned.
    ///
    /// `request` is `None` when the entry never parsed.
    fn on_error(
        &self,
        request: Option<&Request>,
        error: &Error,
        mapped: &ErrorObject,
    ) -> Result<(), Error> {
        let _ = (request, error, mapped);
        Ok(())
    }
}

/// Method-level access control.
///
/// Denied calls fail with METHOD_NOT_FOUND, so callers cannot tell a
/// forbidden method from one that does not exist.
#[derive(Debug, Clone, Default)]
pub struct MethodAccessInterceptor {
    allowlist: HashSet<String>,
    denylist: HashSet<String>,
}

impl MethodAccessInterceptor {
    /// An empty allowlist allows every method not on the denylist.
    pub fn new<A, D>(allowlist: A, denylist: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            allowlist: allowlist.into_iter().map(Into::into).collect(),
            denylist: denylist.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `method` passes both lists.
    pub fn is_allowed(&self, method: &str) -> bool {
        if !self.allowlist.is_empty() && !self.allowlist.contains(method) {
            return false;
        }
        !self.denylist.contains(method)
    }
}

impl Interceptor for MethodAccessInterceptor {
    fn before_invoke(&self, request: &Request) -> Result<(), Error> {
        let method = request.method().unwrap_or_default();
        if self.is_allowed(method) {
            return Ok(());
        }
        Err(Error::rpc(
            ErrorCode::MethodNotFound.code(),
            ErrorCode::MethodNotFound.message(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestId;

    fn call(method: &str) -> Request {
        Request::new(RequestId::from(1), method, None)
    }

    #[test]
    fn empty_lists_allow_everything() {
        let access = MethodAccessInterceptor::default();
        assert!(access.before_invoke(&call("anything")).is_ok());
    }

    #[test]
    fn allowlist_restricts() {
        let access = MethodAccessInterceptor::new(["ping"], Vec::<String>::new());
        assert!(access.before_invoke(&call("ping")).is_ok());
        let err = access.before_invoke(&call("admin")).unwrap_err();
        assert!(matches!(err, Error::RpcError { code: -32601, .. }));
    }

    #[test]
    fn denylist_wins_over_allowlist() {
        let access = MethodAccessInterceptor::new(["ping", "admin"], ["admin"]);
        assert!(access.is_allowed("ping"));
        assert!(!access.is_allowed("admin"));
    }
}
