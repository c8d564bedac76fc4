// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The bridge handler: terminal success/rejection stage of a future chain.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use crate::bridge::{CompletionCallback, CompletionResult, FailureReason};
use crate::errors::BridgeError;
use crate::observability::messages::bridge::{
    HandlerTerminated, SecondaryFailureDetected, TerminationMisuseDetected,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{FailureReporter, InboundMessage, UnitOfWork};

/// What a handler terminates: a completion callback or a unit of work.
pub enum CompletionTarget {
    Callback(CompletionCallback),
    Unit(Box<dyn UnitOfWork>),
}

impl CompletionTarget {
    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            CompletionTarget::Callback(_) => "completion callback".to_string(),
            CompletionTarget::Unit(unit) => format!("unit of work {}", unit.id()),
        }
    }

    fn terminate(self, outcome: &CompletionResult) -> anyhow::Result<()> {
        match (self, outcome) {
            (CompletionTarget::Callback(callback), outcome) => callback.complete(outcome.clone()),
            (CompletionTarget::Unit(unit), CompletionResult::Success) => unit.ack(),
            (CompletionTarget::Unit(unit), CompletionResult::Failure(reason)) => unit.fail(reason),
        }
    }
}

impl From<CompletionCallback> for CompletionTarget {
    fn from(callback: CompletionCallback) -> Self {
        CompletionTarget::Callback(callback)
    }
}

impl From<Box<dyn UnitOfWork>> for CompletionTarget {
    fn from(unit: Box<dyn UnitOfWork>) -> Self {
        CompletionTarget::Unit(unit)
    }
}

impl From<Box<dyn InboundMessage>> for CompletionTarget {
    fn from(message: Box<dyn InboundMessage>) -> Self {
        CompletionTarget::Unit(Box::new(message))
    }
}

impl fmt::Debug for CompletionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// An ack, fail or callback invocation that failed after the outcome was decided.
#[derive(Debug)]
pub struct SecondaryFailure {
    pub target: String,
    pub outcome: CompletionResult,
    pub error: anyhow::Error,
}

impl fmt::Display for SecondaryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "terminating {} with {} failed: {:#}",
            self.target, self.outcome, self.error
        )
    }
}

struct HandlerState {
    label: String,
    target: Mutex<Option<CompletionTarget>>,
    reporter: Option<Arc<dyn FailureReporter>>,
}

/// Terminal stage of a future chain that terminates exactly one target.
///
/// `on_success` passes its value through and `on_reject` forwards the
/// rejection as `BridgeError::Upstream`, so the chain keeps composing after
/// the side effect. Clones share the target: whichever entry point runs first
/// terminates it, every later call returns `BridgeError::TerminationMisuse`
/// without touching the target again. A late rejection keeps its reason in
/// that error.
pub struct BridgeHandler<T> {
    state: Arc<HandlerState>,
    _value: PhantomData<fn(T) -> T>,
}

impl<T> BridgeHandler<T> {
    pub(crate) fn new(target: CompletionTarget, reporter: Option<Arc<dyn FailureReporter>>) -> Self {
        Self {
            state: Arc::new(HandlerState {
                label: target.describe(),
                target: Mutex::new(Some(target)),
                reporter,
            }),
            _value: PhantomData,
        }
    }

    /// Description of the wrapped target.
    pub fn target(&self) -> &str {
        &self.state.label
    }

    pub fn is_terminated(&self) -> bool {
        self.state
            .target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Signal success to the target and hand `value` to the next stage.
    pub fn on_success(&self, value: T) -> Result<T, BridgeError> {
        self.terminate(CompletionResult::Success)?;
        Ok(value)
    }

    /// Signal failure to the target and forward the rejection.
    pub fn on_reject(&self, error: impl Into<FailureReason>) -> Result<T, BridgeError> {
        let reason = error.into();
        self.terminate(CompletionResult::Failure(reason.clone()))?;
        Err(BridgeError::Upstream(reason))
    }

    /// Await `upstream` and route its outcome through this handler.
    pub async fn settle<F>(&self, upstream: F) -> Result<T, BridgeError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        then(upstream, |value| self.on_success(value), |reason| self.on_reject(reason)).await
    }

    fn terminate(&self, outcome: CompletionResult) -> Result<(), BridgeError> {
        let label = self.state.label.as_str();
        let target = self
            .state
            .target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(target) = target else {
            let rejected = outcome.failure();
            TerminationMisuseDetected {
                target: label,
                rejected,
            }
            .log();
            return Err(BridgeError::TerminationMisuse {
                target: label.to_string(),
                rejected: rejected.cloned(),
            });
        };

        match target.terminate(&outcome) {
            Ok(()) => HandlerTerminated {
                target: label,
                outcome: &outcome,
            }
            .log(),
            Err(error) => {
                SecondaryFailureDetected {
                    target: label,
                    outcome: &outcome,
                    error: &error,
                }
                .log();

                if let Some(reporter) = &self.state.reporter {
                    reporter.report(&SecondaryFailure {
                        target: label.to_string(),
                        outcome,
                        error,
                    });
                }
            }
        }

        Ok(())
    }
}

impl<T> Clone for BridgeHandler<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for BridgeHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeHandler")
            .field("target", &self.state.label)
            .field("terminated", &self.is_terminated())
            .finish()
    }
}

/// Attach a success and a rejection handler to the end of a future chain.
///
/// Exactly one of the two runs, with the resolved value or the rejection
/// reason.
pub async fn then<T, F, S, R>(upstream: F, on_success: S, on_reject: R) -> Result<T, BridgeError>
where
    F: Future<Output = anyhow::Result<T>>,
    S: FnOnce(T) -> Result<T, BridgeError>,
    R: FnOnce(FailureReason) -> Result<T, BridgeError>,
{
    match upstream.await {
        Ok(value) => on_success(value),
        Err(error) => on_reject(FailureReason::from(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    enum Termination {
        Acked,
        Failed(String),
    }

    /// Unit of work that records how it was terminated.
    struct RecordingUnit {
        id: String,
        log: Arc<Mutex<Vec<Termination>>>,
        broken: bool,
    }

    impl RecordingUnit {
        fn new(id: &str) -> (Self, Arc<Mutex<Vec<Termination>>>) {
            let log = Arc::new(Mutex::new(Vec::new()));
            let unit = Self {
                id: id.to_string(),
                log: log.clone(),
                broken: false,
            };
            (unit, log)
        }

        fn broken(id: &str) -> (Self, Arc<Mutex<Vec<Termination>>>) {
            let (mut unit, log) = Self::new(id);
            unit.broken = true;
            (unit, log)
        }
    }

    impl UnitOfWork for RecordingUnit {
        fn id(&self) -> &str {
            &self.id
        }

        fn ack(self: Box<Self>) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(Termination::Acked);
            if self.broken {
                return Err(anyhow!("ack channel closed"));
            }
            Ok(())
        }

        fn fail(self: Box<Self>, reason: &FailureReason) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(Termination::Failed(reason.message()));
            if self.broken {
                return Err(anyhow!("fail channel closed"));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingReporter {
        reports: Mutex<Vec<String>>,
    }

    impl FailureReporter for CollectingReporter {
        fn report(&self, failure: &SecondaryFailure) {
            self.reports.lock().unwrap().push(failure.to_string());
        }
    }

    fn unit_handler<T>(unit: RecordingUnit) -> BridgeHandler<T> {
        BridgeHandler::new(CompletionTarget::Unit(Box::new(unit)), None)
    }

    fn recording_callback() -> (CompletionCallback, Arc<Mutex<Vec<CompletionResult>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let callback = CompletionCallback::new(move |result| {
            sink.lock().unwrap().push(result);
            Ok(())
        });
        (callback, calls)
    }

    #[test]
    fn test_callback_success_passes_value_through() {
        let (callback, calls) = recording_callback();
        let handler = BridgeHandler::new(callback.into(), None);

        let result = handler.on_success(42);

        assert_eq!(result.unwrap(), 42);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_success());
    }

    #[test]
    fn test_callback_reject_forwards_error() {
        let (callback, calls) = recording_callback();
        let handler: BridgeHandler<u32> = BridgeHandler::new(callback.into(), None);

        let result = handler.on_reject(anyhow!("x"));

        match result {
            Err(BridgeError::Upstream(reason)) => assert_eq!(reason.message(), "x"),
            other => panic!("Expected upstream rejection, got {:?}", other),
        }
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].failure().map(|r| r.message()), Some("x".to_string()));
    }

    #[test]
    fn test_unit_success_acks_once() {
        let (unit, log) = RecordingUnit::new("in-1");
        let handler = unit_handler(unit);

        assert_eq!(handler.on_success("payload").unwrap(), "payload");
        assert_eq!(*log.lock().unwrap(), vec![Termination::Acked]);
        assert!(handler.is_terminated());
    }

    #[test]
    fn test_unit_reject_fails_with_reason_and_rethrows() {
        let (unit, log) = RecordingUnit::new("in-2");
        let handler: BridgeHandler<()> = unit_handler(unit);

        let error = handler.on_reject(anyhow!("x")).unwrap_err();

        assert_eq!(error.to_string(), "x");
        assert_eq!(
            *log.lock().unwrap(),
            vec![Termination::Failed("x".to_string())]
        );
    }

    #[test]
    fn test_second_termination_is_misuse() {
        let (unit, log) = RecordingUnit::new("in-3");
        let handler = unit_handler(unit);

        handler.on_success(1).unwrap();
        let misuse = handler.on_reject(anyhow!("late"));

        assert!(matches!(misuse, Err(BridgeError::TerminationMisuse { .. })));
        assert_eq!(*log.lock().unwrap(), vec![Termination::Acked]);
    }

    #[test]
    fn test_reject_then_success_is_misuse() {
        let (callback, calls) = recording_callback();
        let handler = BridgeHandler::new(callback.into(), None);

        let _ = handler.on_reject(anyhow!("first"));
        let misuse = handler.on_success(7);

        match misuse {
            Err(BridgeError::TerminationMisuse { target, rejected }) => {
                assert_eq!(target, "completion callback");
                assert!(rejected.is_none());
            }
            other => panic!("Expected TerminationMisuse, got {:?}", other),
        }
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_late_rejection_keeps_its_reason() {
        let (unit, log) = RecordingUnit::new("in-9");
        let handler: BridgeHandler<u8> = unit_handler(unit);

        handler.on_success(1).unwrap();
        let misuse = handler.on_reject(anyhow!("disk full")).unwrap_err();

        assert!(matches!(misuse, BridgeError::TerminationMisuse { .. }));
        assert_eq!(misuse.upstream().map(|r| r.message()), Some("disk full".to_string()));
        assert_eq!(
            misuse.to_string(),
            "Completion handler for unit of work in-9 was already terminated (late rejection: disk full)"
        );
        assert_eq!(*log.lock().unwrap(), vec![Termination::Acked]);
    }

    #[test]
    fn test_clones_share_termination() {
        let (unit, log) = RecordingUnit::new("in-4");
        let handler = unit_handler(unit);
        let twin = handler.clone();

        handler.on_success(()).unwrap();

        assert!(twin.is_terminated());
        assert!(twin.on_success(()).is_err());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_secondary_failure_is_reported_and_does_not_mask_value() {
        let (unit, log) = RecordingUnit::broken("in-5");
        let reporter = Arc::new(CollectingReporter::default());
        let handler = BridgeHandler::new(
            CompletionTarget::Unit(Box::new(unit)),
            Some(reporter.clone() as Arc<dyn FailureReporter>),
        );

        assert_eq!(handler.on_success(9).unwrap(), 9);

        assert_eq!(log.lock().unwrap().len(), 1);
        let reports = reporter.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains("unit of work in-5"));
        assert!(reports[0].contains("ack channel closed"));
    }

    #[test]
    fn test_secondary_failure_does_not_replace_rejection() {
        let (unit, _log) = RecordingUnit::broken("in-6");
        let reporter = Arc::new(CollectingReporter::default());
        let handler: BridgeHandler<()> = BridgeHandler::new(
            CompletionTarget::Unit(Box::new(unit)),
            Some(reporter.clone() as Arc<dyn FailureReporter>),
        );

        let error = handler.on_reject(anyhow!("primary")).unwrap_err();

        assert_eq!(error.upstream().map(|r| r.message()), Some("primary".to_string()));
        assert!(reporter.reports.lock().unwrap()[0].contains("fail channel closed"));
    }

    #[tokio::test]
    async fn test_settle_routes_resolved_future() {
        let (unit, log) = RecordingUnit::new("in-7");
        let handler = unit_handler(unit);

        let value = handler.settle(async { Ok::<_, anyhow::Error>(5 * 5) }).await;

        assert_eq!(value.unwrap(), 25);
        assert_eq!(*log.lock().unwrap(), vec![Termination::Acked]);
    }

    #[tokio::test]
    async fn test_settle_routes_rejected_future() {
        let (unit, log) = RecordingUnit::new("in-8");
        let handler: BridgeHandler<u8> = unit_handler(unit);

        let result = handler
            .settle(async { Err(anyhow!("parse error")) })
            .await;

        assert_eq!(result.unwrap_err().to_string(), "parse error");
        assert_eq!(
            *log.lock().unwrap(),
            vec![Termination::Failed("parse error".to_string())]
        );
    }

    #[tokio::test]
    async fn test_then_runs_exactly_one_side() {
        let successes = AtomicUsize::new(0);
        let rejections = AtomicUsize::new(0);

        let result = then(
            async { Err::<u8, _>(anyhow!("nope")) },
            |v| {
                successes.fetch_add(1, Ordering::SeqCst);
                Ok(v)
            },
            |reason| {
                rejections.fetch_add(1, Ordering::SeqCst);
                Err(BridgeError::Upstream(reason))
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(successes.load(Ordering::SeqCst), 0);
        assert_eq!(rejections.load(Ordering::SeqCst), 1);
    }
}
