//! Engine configuration.
//!
//! Plain values only. `DispatcherConfig` deserializes from kebab-case keys so
//! it can be embedded in an application's own settings file:
//!
//! ```
//! use jsonrpc_dispatch::{ConflictPolicy, DispatcherConfig};
//!
//! let config: DispatcherConfig = serde_json::from_str(
//!     r#"{"max-batch-size": 10, "method-registration-conflict-policy": "replace"}"#,
//! )?;
//! assert_eq!(config.max_batch_size, 10);
//! assert_eq!(config.method_registration_conflict_policy, ConflictPolicy::Replace);
//! assert!(!config.include_error_data);
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::thread;

use serde::Deserialize;

use crate::error::Error;
use crate::registry::ConflictPolicy;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1_048_576;

fn default_worker_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DispatcherConfig {
    /// Batches longer than this are rejected whole.
    pub max_batch_size: usize,
    pub method_registration_conflict_policy: ConflictPolicy,
    /// Keep `data` of declared faults in error responses.
    pub include_error_data: bool,
    /// Run notifications on a worker pool instead of inline.
    pub notification_executor_enabled: bool,
    pub notification_worker_threads: usize,
    /// Body size limit enforced by transports before decoding.
    pub max_request_bytes: usize,
    pub method_allowlist: Vec<String>,
    pub method_denylist: Vec<String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            method_registration_conflict_policy: ConflictPolicy::Reject,
            include_error_data: false,
            notification_executor_enabled: false,
            notification_worker_threads: default_worker_threads(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            method_allowlist: Vec::new(),
            method_denylist: Vec::new(),
        }
    }
}

impl DispatcherConfig {
    /// Configuration with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest accepted batch.
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Set what happens on duplicate registration.
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.method_registration_conflict_policy = policy;
        self
    }

    /// Keep `data` of declared faults in responses.
    pub fn with_include_error_data(mut self, include: bool) -> Self {
        self.include_error_data = include;
        self
    }

    /// Offload notifications to a pool of `worker_threads` workers.
    pub fn with_notification_executor(mut self, worker_threads: usize) -> Self {
        self.notification_executor_enabled = true;
        self.notification_worker_threads = worker_threads;
        self
    }

    /// Set the transport body size limit.
    pub fn with_max_request_bytes(mut self, bytes: usize) -> Self {
        self.max_request_bytes = bytes;
        self
    }

    /// Only allow these methods.
    pub fn with_method_allowlist<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method_allowlist = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Hide these methods.
    pub fn with_method_denylist<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method_denylist = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_batch_size == 0 {
            return Err(Error::invalid_argument(
                "max-batch-size must be greater than 0",
            ));
        }
        if self.max_request_bytes == 0 {
            return Err(Error::invalid_argument(
                "max-request-bytes must be greater than 0",
            ));
        }
        if self.notification_executor_enabled && self.notification_worker_threads == 0 {
            return Err(Error::invalid_argument(
                "notification-worker-threads must be greater than 0",
            ));
        }
        if self.method_allowlist.iter().any(|m| m.trim().is_empty()) {
            return Err(Error::invalid_argument(
                "method-allowlist entries must not be blank",
            ));
        }
        if self.method_denylist.iter().any(|m| m.trim().is_empty()) {
            return Err(Error::invalid_argument(
                "method-denylist entries must not be blank",
            ));
        }
        Ok(())
    }

    /// Whether either access list is non-empty.
    pub fn has_access_rules(&self) -> bool {
        !self.method_allowlist.is_empty() || !self.method_denylist.is_empty()
    }
}
