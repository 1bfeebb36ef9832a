//! Transport implementations for JSON-RPC 2.0 communication.
//!
//! Transports are collaborators of the dispatch engine: they move raw
//! messages and leave decoding and dispatch to [`Server`](crate::Server).
//! All transports implement the common [`Transport`] trait, making them
//! interchangeable.

pub use in_memory::InMemory;
pub use stdio::Stdio;
pub use transport::Transport;

pub mod in_memory;
pub mod stdio;
pub mod transport;
