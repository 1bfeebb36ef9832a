//! Notification execution strategies.
//!
//! A notification never produces a response, so the engine only needs to
//! decide *where* its invocation runs. The task handed to an executor is
//! already wrapped with interceptor and error handling; executors only
//! guarantee that it runs at most once and that nothing it does reaches the
//! submitting call.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use tracing::{debug, warn};

use crate::error::Error;

/// A unit of notification work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs notification tasks.
pub trait NotificationExecutor: Send + Sync {
    /// Run or schedule `task`.
    ///
    /// An error means the task was not accepted and will never run.
    fn execute(&self, task: Task) -> Result<(), Error>;
}

/// Runs the task inline on the dispatching thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectNotificationExecutor;

impl NotificationExecutor for DirectNotificationExecutor {
    fn execute(&self, task: Task) -> Result<(), Error> {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            warn!("Notification task panicked");
        }
        Ok(())
    }
}

/// Worker thread in the pool.
struct Worker {
    handle: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn spawn(id: usize, receiver: Arc<Mutex<Receiver<Task>>>) -> Result<Self, Error> {
        let handle = thread::Builder::new()
            .name(format!("jsonrpc-notify-{id}"))
            .spawn(move || {
                loop {
                    let task = {
                        let rx = receiver.lock().unwrap_or_else(PoisonError::into_inner);
                        rx.recv()
                    };

                    match task {
                        Ok(task) => {
                            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                                warn!(worker = id, "Notification task panicked");
                            }
                        }
                        Err(_) => break,
                    }
                }
                debug!(worker = id, "Notification worker stopped");
            })?;

        Ok(Self {
            handle: Some(handle),
        })
    }
}

/// Hands tasks to a fixed pool of worker threads and returns immediately.
///
/// Dropping the executor closes the queue; workers finish the tasks already
/// queued and are joined.
pub struct ThreadPoolNotificationExecutor {
    workers: Vec<Worker>,
    sender: Option<Mutex<Sender<Task>>>,
}

impl ThreadPoolNotificationExecutor {
    /// Create a pool with `size` workers.
    pub fn new(size: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::invalid_argument(
                "notification worker count must be greater than 0",
            ));
        }

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            workers.push(Worker::spawn(id, Arc::clone(&receiver))?);
        }

        Ok(Self {
            workers,
            sender: Some(Mutex::new(sender)),
        })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl NotificationExecutor for ThreadPoolNotificationExecutor {
    fn execute(&self, task: Task) -> Result<(), Error> {
        let sender = self.sender.as_ref().ok_or_else(|| {
            Error::transport(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Notification pool is not available",
            ))
        })?;

        sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send(task)
            .map_err(|_| {
                Error::transport(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "Failed to send task to notification pool",
                ))
            })
    }
}

impl Drop for ThreadPoolNotificationExecutor {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

impl std::fmt::Debug for ThreadPoolNotificationExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPoolNotificationExecutor")
            .field("size", &self.workers.len())
            .finish()
    }
}

/// Hands tasks to a Tokio runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct TokioNotificationExecutor {
    handle: tokio::runtime::Handle,
}

impl TokioNotificationExecutor {
    /// Spawn tasks on the runtime behind `handle`.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Capture the runtime the caller is running on.
    ///
    /// Fails outside a Tokio runtime.
    pub fn current() -> Result<Self, Error> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| Error::internal(e.to_string()))
    }
}

impl NotificationExecutor for TokioNotificationExecutor {
    fn execute(&self, task: Task) -> Result<(), Error> {
        // The JoinHandle is dropped on purpose: completion is never awaited.
        let _ = self.handle.spawn_blocking(move || {
            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                warn!("Notification task panicked");
            }
        });
        Ok(())
    }
}
