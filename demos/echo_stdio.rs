//! A JSON-RPC 2.0 echo server over stdio.
//!
//! Reads newline-delimited JSON-RPC messages from stdin and writes one
//! response line per reply to stdout. Logs go to stderr; set `RUST_LOG` to
//! change the level.
//!
//! Usage:
//!
//! ```bash
//! echo '{"jsonrpc":"2.0","method":"echo","params":{"message":"hello"},"id":1}' | cargo run --example echo_stdio
//! ```
//!
//! Expected response:
//!
//! ```json
//! {"jsonrpc":"2.0","result":{"message":"hello"},"id":1}
//! ```

use std::sync::Arc;

use anyhow::Result;
use jsonrpc_dispatch::{Dispatcher, DispatcherConfig, Error, Server};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DispatcherConfig::new().with_max_batch_size(10);
    let dispatcher = Arc::new(Dispatcher::builder().config(config).build()?);

    dispatcher.register_unary("echo", |params: Value| Ok(params))?;
    dispatcher.register_no_params("ping", || Ok("pong"))?;
    dispatcher.register_unary("add", |(a, b): (i64, i64)| Ok(a + b))?;
    dispatcher.register_unary("log", |(message,): (String,)| {
        info!(%message, "log notification");
        Ok(Value::Null)
    })?;
    dispatcher.register("fail", |_: Option<Value>| -> Result<Value, Error> {
        Err(Error::rpc_with_data(
            -32001,
            "Requested failure",
            json!({"hint": "hidden unless include-error-data is set"}),
        ))
    })?;

    info!(
        methods = ?dispatcher.registry().method_names(),
        "Echo server started. Send JSON-RPC messages via stdin."
    );

    Server::new(dispatcher).run()?;

    info!("Input closed, exiting");
    Ok(())
}
