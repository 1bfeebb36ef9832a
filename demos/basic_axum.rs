//! A JSON-RPC 2.0 server over HTTP using axum.
//!
//! Usage:
//!
//! ```bash
//! cargo run --example basic_axum --features axum
//! ```
//!
//! Then send requests:
//!
//! ```bash
//! curl -X POST http://localhost:3000/jsonrpc \
//!   -H "Content-Type: application/json" \
//!   -d '{"jsonrpc":"2.0","method":"hello","params":["world"],"id":1}'
//! ```
//!
//! Expected response:
//!
//! ```json
//! {"jsonrpc":"2.0","result":"Hello, world!","id":1}
//! ```
//!
//! This demo requires the "axum" feature to be enabled.

use std::sync::Arc;

use anyhow::Result;
use jsonrpc_dispatch::{
    Dispatcher, DispatcherConfig, Error, TokioNotificationExecutor, axum::router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn hello((name,): (String,)) -> Result<String, Error> {
    info!(%name, "hello called");

    if name == "world" {
        Ok(format!("Hello, {name}!"))
    } else {
        Err(Error::rpc(-32000, "text must be 'world'"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DispatcherConfig::new()
        .with_include_error_data(true)
        .with_method_denylist(["internal_error"]);
    let dispatcher = Dispatcher::builder()
        .config(config)
        .notification_executor(TokioNotificationExecutor::current()?)
        .build()?;

    dispatcher.register_unary("hello", hello)?;
    dispatcher.register_no_params("internal_error", || -> Result<String, Error> {
        Err(Error::internal("Internal error occurred"))
    })?;

    let app = router(Arc::new(dispatcher), "/jsonrpc");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    let local_addr = listener.local_addr()?;

    info!("Server started on http://{local_addr}");
    info!("JSON-RPC endpoint: http://{local_addr}/jsonrpc");

    axum::serve(listener, app).await?;
    Ok(())
}
