// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Completion results and the callback-style completion sink.

use anyhow::anyhow;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

/// Shareable reason for a failed unit of work.
///
/// Wraps the upstream `anyhow::Error` in an `Arc` so the same reason can be
/// handed to the completion target and still be forwarded down the chain.
#[derive(Debug, Clone)]
pub struct FailureReason(Arc<anyhow::Error>);

impl FailureReason {
    /// Build a reason from a plain message.
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::msg(message)))
    }

    /// The underlying error.
    pub fn error(&self) -> &anyhow::Error {
        &self.0
    }

    /// The top-level message, without the cause chain.
    pub fn message(&self) -> String {
        self.0.to_string()
    }
}

impl From<anyhow::Error> for FailureReason {
    fn from(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Outcome of one unit of asynchronous work.
#[derive(Debug, Clone)]
pub enum CompletionResult {
    Success,
    Failure(FailureReason),
}

impl CompletionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionResult::Success)
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            CompletionResult::Success => None,
            CompletionResult::Failure(reason) => Some(reason),
        }
    }
}

impl fmt::Display for CompletionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionResult::Success => write!(f, "success"),
            CompletionResult::Failure(reason) => write!(f, "failure: {}", reason),
        }
    }
}

type CallbackFn = Box<dyn FnOnce(CompletionResult) -> anyhow::Result<()> + Send>;

/// A completion sink invoked at most once.
///
/// Clones share a single slot, so the same callback can be bound to both the
/// success and the rejection side of a chain and still fire only once. A
/// second invocation returns an error instead of running the function.
#[derive(Clone)]
pub struct CompletionCallback {
    slot: Arc<Mutex<Option<CallbackFn>>>,
}

impl CompletionCallback {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(CompletionResult) -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            slot: Arc::new(Mutex::new(Some(Box::new(callback)))),
        }
    }

    /// Deliver the result over a oneshot channel.
    ///
    /// Completing after the receiver was dropped is an error.
    pub fn from_sender(sender: oneshot::Sender<CompletionResult>) -> Self {
        Self::new(move |result| {
            sender
                .send(result)
                .map_err(|_| anyhow!("completion receiver was dropped"))
        })
    }

    /// Create a callback together with the receiver that observes its result.
    pub fn channel() -> (Self, oneshot::Receiver<CompletionResult>) {
        let (sender, receiver) = oneshot::channel();
        (Self::from_sender(sender), receiver)
    }

    /// Invoke the callback with `result`.
    pub fn complete(&self, result: CompletionResult) -> anyhow::Result<()> {
        let callback = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match callback {
            Some(callback) => callback(result),
            None => Err(anyhow!("completion callback was already invoked")),
        }
    }

    /// Whether the callback has already run.
    pub fn is_spent(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl fmt::Debug for CompletionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionCallback")
            .field("spent", &self.is_spent())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_callback_runs_once_across_clones() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let callback = CompletionCallback::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let twin = callback.clone();

        assert!(callback.complete(CompletionResult::Success).is_ok());
        let second = twin.complete(CompletionResult::Success);

        assert!(second.is_err());
        assert!(second.unwrap_err().to_string().contains("already invoked"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(twin.is_spent());
    }

    #[tokio::test]
    async fn test_channel_callback_delivers_result() {
        let (callback, receiver) = CompletionCallback::channel();

        callback
            .complete(CompletionResult::Failure(FailureReason::msg("boom")))
            .unwrap();

        let result = receiver.await.unwrap();
        assert_eq!(result.failure().map(|r| r.message()), Some("boom".to_string()));
    }

    #[test]
    fn test_channel_callback_errors_when_receiver_dropped() {
        let (callback, receiver) = CompletionCallback::channel();
        drop(receiver);

        let result = callback.complete(CompletionResult::Success);
        assert!(result.is_err());
    }

    #[test]
    fn test_failure_reason_alternate_includes_context() {
        let error = anyhow!("disk full").context("writing checkpoint");
        let reason = FailureReason::from(error);

        assert_eq!(reason.to_string(), "writing checkpoint");
        assert_eq!(format!("{:#}", reason), "writing checkpoint: disk full");
    }
}
