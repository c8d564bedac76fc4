// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bridges future completion to ack/fail and callback completion.
//!
//! A `BridgeHandler` is the terminal stage of a future chain. When the chain
//! resolves it acks the unit of work (or completes the callback with
//! `Success`) and passes the value on; when the chain rejects it fails the
//! unit (or completes the callback with `Failure`) and forwards the error.
//!
//! ```
//! use dagwood_bridge::bridge::{CompletionBridge, CompletionCallback};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (callback, completed) = CompletionCallback::channel();
//! let handler = CompletionBridge::new().for_callback(callback);
//!
//! let value = handler.settle(async { Ok(42) }).await.unwrap();
//!
//! assert_eq!(value, 42);
//! assert!(completed.await.unwrap().is_success());
//! # }
//! ```

mod completion;
mod handler;

use std::sync::Arc;

pub use completion::{CompletionCallback, CompletionResult, FailureReason};
pub use handler::{then, BridgeHandler, CompletionTarget, SecondaryFailure};

use crate::traits::{FailureReporter, UnitOfWork};

/// Factory for `BridgeHandler`s sharing one failure reporter.
#[derive(Clone, Default)]
pub struct CompletionBridge {
    reporter: Option<Arc<dyn FailureReporter>>,
}

impl CompletionBridge {
    /// Create a bridge whose secondary failures are only logged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bridge that also hands secondary failures to `reporter`.
    pub fn with_reporter(reporter: Arc<dyn FailureReporter>) -> Self {
        Self {
            reporter: Some(reporter),
        }
    }

    /// Wrap a completion callback.
    pub fn for_callback<T>(&self, callback: CompletionCallback) -> BridgeHandler<T> {
        self.handler(callback)
    }

    /// Wrap a unit of work that must be acked or failed.
    pub fn for_unit_of_work<T, U>(&self, unit: U) -> BridgeHandler<T>
    where
        U: UnitOfWork + 'static,
    {
        self.handler(CompletionTarget::Unit(Box::new(unit)))
    }

    /// Wrap any completion target.
    pub fn handler<T>(&self, target: impl Into<CompletionTarget>) -> BridgeHandler<T> {
        BridgeHandler::new(target.into(), self.reporter.clone())
    }
}

impl std::fmt::Debug for CompletionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionBridge")
            .field("has_reporter", &self.reporter.is_some())
            .finish()
    }
}
