//! Blocking message loop that connects a [`Transport`] to a [`Dispatcher`].
//!
//! The server owns no protocol logic. It only enforces the body size limit,
//! decodes JSON, hands the value to the dispatcher and writes back whatever
//! body the dispatch produced.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use crate::dispatcher::Dispatcher;
use crate::error::Error;
use crate::shutdown::ShutdownSignal;
use crate::transports::{Stdio, Transport};
use crate::types::{DispatchResult, Response};

/// Serialize a single response. Failures are logged and yield no body.
pub(crate) fn encode_response(response: &Response) -> Option<String> {
    serde_json::to_string(response)
        .map_err(|e| error!(error = %e, "Failed to serialize response"))
        .ok()
}

/// Serialize a dispatch result, `None` when there is nothing to send.
pub(crate) fn encode_result(result: &DispatchResult) -> Option<String> {
    match result.to_json_string() {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "Failed to serialize dispatch result");
            None
        }
    }
}

/// JSON-RPC server driving a transport.
///
/// Messages are handled one at a time in arrival order. Notifications are
/// still handed to the dispatcher's notification executor, so they may run
/// elsewhere.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use jsonrpc_dispatch::{Dispatcher, Server, ShutdownSignal};
///
/// let dispatcher = Arc::new(Dispatcher::new());
/// dispatcher.register_unary("echo", |params: serde_json::Value| Ok(params))?;
///
/// let shutdown = ShutdownSignal::new();
/// Server::new(dispatcher)
///     .with_shutdown_signal(shutdown.clone())
///     .run()?;
/// # Ok::<(), jsonrpc_dispatch::Error>(())
/// ```
pub struct Server {
    dispatcher: Arc<Dispatcher>,
    transport: Option<Box<dyn Transport>>,
    shutdown_signal: Option<ShutdownSignal>,
}

impl Server {
    /// Create a server reading NDJSON from stdin unless another transport is
    /// set.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            transport: None,
            shutdown_signal: None,
        }
    }

    /// Stop the loop once this signal is raised.
    pub fn with_shutdown_signal(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Use `transport` instead of stdio.
    pub fn with_transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Box::new(transport));
        self
    }

    /// The dispatcher messages are handed to.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Handle one raw message and return the body to send back, if any.
    ///
    /// Oversized messages and undecodable JSON get their fixed error
    /// responses with a null id.
    pub fn handle_message(&self, message: &str) -> Option<String> {
        if message.len() > self.dispatcher.max_request_bytes() {
            debug!(
                size = message.len(),
                max = self.dispatcher.max_request_bytes(),
                "Rejecting oversized message"
            );
            return encode_response(&Dispatcher::payload_too_large_response());
        }

        let payload: Value = match serde_json::from_str(message) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(error = %e, "Failed to parse JSON message");
                return encode_response(&Dispatcher::parse_error_response());
            }
        };

        encode_result(&self.dispatcher.dispatch(&payload))
    }

    /// Run the message loop.
    ///
    /// Blocks until the input ends or the shutdown signal is raised. Any
    /// transport failure other than end of input is returned.
    pub fn run(&mut self) -> Result<(), Error> {
        let mut transport = self
            .transport
            .take()
            .unwrap_or_else(|| Box::new(Stdio::new()) as Box<dyn Transport>);

        loop {
            if let Some(ref signal) = self.shutdown_signal
                && signal.is_shutdown_requested()
            {
                debug!("Shutdown requested, stopping server");
                break;
            }

            let message = match transport.receive_message() {
                Ok(message) => message,
                Err(Error::TransportError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("EOF received, stopping server");
                    break;
                }
                Err(e) => return Err(e),
            };

            if let Some(body) = self.handle_message(&message) {
                transport.send_message(&body)?;
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("dispatcher", &self.dispatcher)
            .field("shutdown_signal", &self.shutdown_signal)
            .finish_non_exhaustive()
    }
}
