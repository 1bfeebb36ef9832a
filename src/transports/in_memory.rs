//! In-memory transport for JSON-RPC 2.0.
//!
//! Channel-backed transport for driving a [`Server`](crate::Server) from the
//! same process, mostly in tests. Both ends use the blocking half of Tokio's
//! bounded channels, so they must not be used from inside an async task.

use tokio::sync::mpsc;

use crate::error::Error;
use crate::transports::Transport;

const CHANNEL_CAPACITY: usize = 128;

/// In-memory transport for JSON-RPC messages.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::thread;
///
/// use jsonrpc_dispatch::{Dispatcher, InMemory, Server};
///
/// let dispatcher = Arc::new(Dispatcher::new());
/// dispatcher.register_no_params("ping", || Ok("pong"))?;
///
/// let (server_end, mut client_end) = InMemory::pair();
/// thread::spawn(move || Server::new(dispatcher).with_transport(server_end).run());
///
/// let response = client_end.send_and_receive(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#)?;
/// assert_eq!(response, r#"{"jsonrpc":"2.0","result":"pong","id":1}"#);
/// # Ok::<(), jsonrpc_dispatch::Error>(())
/// ```
pub struct InMemory {
    receiver: mpsc::Receiver<String>,
    sender: mpsc::Sender<String>,
}

impl InMemory {
    /// Create a transport from an existing channel pair.
    pub fn new(receiver: mpsc::Receiver<String>, sender: mpsc::Sender<String>) -> Self {
        Self { receiver, sender }
    }

    /// Create two connected transports.
    ///
    /// Messages sent on one end are received by the other.
    pub fn pair() -> (Self, Self) {
        let (sender_a, receiver_a) = mpsc::channel(CHANNEL_CAPACITY);
        let (sender_b, receiver_b) = mpsc::channel(CHANNEL_CAPACITY);

        (Self::new(receiver_b, sender_a), Self::new(receiver_a, sender_b))
    }

    /// Send a message and block until the next message arrives.
    ///
    /// Notifications produce no reply, so only use this for calls.
    pub fn send_and_receive(&mut self, request: &str) -> Result<String, Error> {
        self.send_message(request)?;
        self.receive_message()
    }
}

impl Transport for InMemory {
    fn receive_message(&mut self) -> Result<String, Error> {
        self.receiver.blocking_recv().ok_or_else(|| {
            Error::TransportError(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "Sender disconnected",
            ))
        })
    }

    fn send_message(&mut self, json: &str) -> Result<(), Error> {
        self.sender.blocking_send(json.to_string()).map_err(|_| {
            Error::TransportError(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Receiver disconnected",
            ))
        })
    }
}
