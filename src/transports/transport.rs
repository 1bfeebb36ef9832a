//! Transport trait for JSON-RPC 2.0 communication.
//!
//! This module defines the common interface that all transport implementations
//! must support. Transports move raw strings only; decoding and dispatch are
//! the job of [`Server`](crate::Server).

use crate::error::Error;

/// Trait defining the interface for message-oriented JSON-RPC transports.
///
/// A transport is responsible for sending and receiving complete JSON-RPC
/// messages. Different implementations can support different communication
/// mechanisms (stdio, in-memory channels, sockets).
pub trait Transport: Send {
    /// Receive one raw message.
    ///
    /// This method should block until a complete message is received. End of
    /// input is reported as a `TransportError` of kind `UnexpectedEof`.
    fn receive_message(&mut self) -> Result<String, Error>;

    /// Send one raw message.
    fn send_message(&mut self, json: &str) -> Result<(), Error>;
}
