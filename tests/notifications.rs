//! Integration tests for notification execution strategies.
//!
//! Run test:
//!
//! ```shell
//! cargo test --test notifications
//! ```

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jsonrpc_dispatch::{
    Dispatcher, DispatcherConfig, Error, ErrorObject, Interceptor, Request,
    TokioNotificationExecutor,
};
use serde_json::{Value, json};

const TIMEOUT: Duration = Duration::from_secs(5);

fn notify(method: &str) -> Value {
    json!({"jsonrpc": "2.0", "method": method, "params": ["payload"]})
}

#[test]
fn direct_executor_runs_before_dispatch_returns() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::new();
    let sink = Arc::clone(&seen);
    dispatcher
        .register_unary("record", move |(value,): (String,)| {
            sink.lock().unwrap().push(value);
            Ok(())
        })
        .unwrap();

    let result = dispatcher.dispatch(&notify("record"));
    assert!(!result.has_response());
    assert_eq!(*seen.lock().unwrap(), vec!["payload".to_string()]);
}

#[test]
fn pooled_executor_returns_before_handler_completes() {
    let dispatcher = Dispatcher::builder()
        .config(DispatcherConfig::new().with_notification_executor(1))
        .build()
        .unwrap();

    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (done_tx, done_rx) = mpsc::channel::<String>();
    let release_rx = Mutex::new(release_rx);
    let done_tx = Mutex::new(done_tx);
    dispatcher
        .register_unary("slow", move |(value,): (String,)| {
            let _ = release_rx.lock().unwrap().recv_timeout(TIMEOUT);
            let _ = done_tx.lock().unwrap().send(value);
            Ok(())
        })
        .unwrap();

    let result = dispatcher.dispatch(&notify("slow"));
    assert!(!result.has_response());
    assert!(done_rx.try_recv().is_err());

    release_tx.send(()).unwrap();
    assert_eq!(done_rx.recv_timeout(TIMEOUT).unwrap(), "payload");
}

#[test]
fn pooled_notification_failures_reach_on_error_only() {
    #[derive(Clone)]
    struct Forward(Arc<Mutex<mpsc::Sender<(Option<String>, i32)>>>);

    impl Interceptor for Forward {
        fn on_error(
            &self,
            request: Option<&Request>,
            _error: &Error,
            mapped: &ErrorObject,
        ) -> Result<(), Error> {
            let method = request.and_then(Request::method).map(str::to_string);
            let _ = self.0.lock().unwrap().send((method, mapped.code));
            Ok(())
        }
    }

    let (tx, rx) = mpsc::channel();
    let dispatcher = Dispatcher::builder()
        .config(DispatcherConfig::new().with_notification_executor(2))
        .interceptor(Forward(Arc::new(Mutex::new(tx))))
        .build()
        .unwrap();
    dispatcher
        .register("explode", |_: Option<Value>| -> Result<Value, Error> {
            Err(Error::rpc(-32050, "exploded"))
        })
        .unwrap();

    let result = dispatcher.dispatch(&json!([
        {"jsonrpc": "2.0", "method": "explode"},
        {"jsonrpc": "2.0", "method": "explode", "id": 9}
    ]));

    // Only the call produces a response entry.
    assert_eq!(result.responses().len(), 1);
    assert_eq!(result.responses()[0].error_object().unwrap().code, -32050);

    let mut reports = vec![rx.recv_timeout(TIMEOUT).unwrap(), rx.recv_timeout(TIMEOUT).unwrap()];
    reports.sort();
    assert_eq!(
        reports,
        vec![
            (Some("explode".to_string()), -32050),
            (Some("explode".to_string()), -32050)
        ]
    );
}

#[test]
fn panicking_notification_handler_is_contained() {
    let dispatcher = Dispatcher::builder()
        .config(DispatcherConfig::new().with_notification_executor(1))
        .build()
        .unwrap();
    dispatcher
        .register("panic", |_: Option<Value>| -> Result<Value, Error> {
            panic!("handler panicked")
        })
        .unwrap();
    let (tx, rx) = mpsc::channel::<()>();
    let tx = Mutex::new(tx);
    dispatcher
        .register_no_params("after", move || {
            let _ = tx.lock().unwrap().send(());
            Ok(())
        })
        .unwrap();

    assert!(!dispatcher.dispatch(&notify("panic")).has_response());
    assert!(
        !dispatcher
            .dispatch(&json!({"jsonrpc": "2.0", "method": "after"}))
            .has_response()
    );
    rx.recv_timeout(TIMEOUT).unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn tokio_executor_offloads_notifications() {
    let dispatcher = Dispatcher::builder()
        .notification_executor(TokioNotificationExecutor::current().unwrap())
        .build()
        .unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<String>();
    let tx = Mutex::new(Some(tx));
    dispatcher
        .register_unary("record", move |(value,): (String,)| {
            if let Some(tx) = tx.lock().unwrap().take() {
                let _ = tx.send(value);
            }
            Ok(())
        })
        .unwrap();

    let result = dispatcher.dispatch(&notify("record"));
    assert!(!result.has_response());

    let value = tokio::time::timeout(TIMEOUT, rx).await.unwrap().unwrap();
    assert_eq!(value, "payload");
}
