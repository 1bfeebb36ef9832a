//! Failure to error-object resolution.

use crate::error::Error;
use crate::types::{ErrorCode, ErrorObject};

/// Maps any [`Error`] to the error object returned to the caller.
pub trait ExceptionResolver: Send + Sync {
    fn resolve(&self, error: &Error) -> ErrorObject;
}

/// The stock resolver.
///
/// Declared faults pass through with their code and message; their `data`
/// is kept only when `include_error_data` is set. Invalid-argument failures
/// become INVALID_PARAMS. Everything else collapses to INTERNAL_ERROR with a
/// fixed message so no internal detail reaches the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExceptionResolver {
    include_error_data: bool,
}

impl DefaultExceptionResolver {
    /// Create a resolver with the given error data policy.
    pub fn new(include_error_data: bool) -> Self {
        Self { include_error_data }
    }

    /// Whether declared fault data is passed through.
    pub fn include_error_data(&self) -> bool {
        self.include_error_data
    }
}

impl ExceptionResolver for DefaultExceptionResolver {
    fn resolve(&self, error: &Error) -> ErrorObject {
        match error {
            Error::RpcError {
                code,
                message,
                data,
            } => {
                let data = if self.include_error_data {
                    data.clone()
                } else {
                    None
                };
                ErrorObject::new(*code, message.clone(), data)
            }
            Error::InvalidArgument(message) if message.is_empty() => {
                ErrorObject::invalid_params(ErrorCode::InvalidParams.message())
            }
            Error::InvalidArgument(message) => ErrorObject::invalid_params(message.clone()),
            _ => ErrorObject::internal_error(),
        }
    }
}
