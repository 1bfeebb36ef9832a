//! Error types for the dispatch engine.
//!
//! This module defines the failure value that flows through every dispatch
//! stage. It is distinct from the JSON-RPC wire error object defined in the
//! `types` module: an [`Error`] is what a stage *returns*, an
//! [`ErrorObject`](crate::types::ErrorObject) is what the caller *receives*
//! after the exception resolver has mapped it.

use std::io;

use serde_json::Value;

/// Failures produced by handlers, interceptors and the engine itself.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A declared JSON-RPC fault carrying its own code, message and data.
    #[error("JSON-RPC error {code}: {message}")]
    RpcError {
        code: i32,
        message: String,
        data: Option<Value>,
    },

    /// An argument was rejected, either at registration time or while
    /// binding request parameters.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A method with this name is already registered.
    #[error("Method already registered: {0}")]
    AlreadyRegistered(String),

    /// Transport I/O error.
    #[error("Transport error: {0}")]
    TransportError(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Any other application failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a declared JSON-RPC fault without data.
    pub fn rpc(code: i32, message: impl Into<String>) -> Self {
        Self::RpcError {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create a declared JSON-RPC fault with attached data.
    pub fn rpc_with_data(code: i32, message: impl Into<String>, data: Value) -> Self {
        Self::RpcError {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a transport error.
    pub fn transport(error: impl Into<io::Error>) -> Self {
        Self::TransportError(error.into())
    }
}
