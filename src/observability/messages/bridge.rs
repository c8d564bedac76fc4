// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for completion handler events.
//!
//! This module contains message types for logging events related to:
//! * A handler terminating its target (ack, fail or callback)
//! * A handler being terminated a second time
//! * The terminal side effect itself failing

use crate::bridge::{CompletionResult, FailureReason};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Handler terminated its target.
///
/// # Log Level
/// `debug!` - Emitted once per unit of work
///
/// # Example
/// ```
/// use dagwood_bridge::bridge::CompletionResult;
/// use dagwood_bridge::observability::messages::bridge::HandlerTerminated;
///
/// let msg = HandlerTerminated {
///     target: "message in-7",
///     outcome: &CompletionResult::Success,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct HandlerTerminated<'a> {
    pub target: &'a str,
    pub outcome: &'a CompletionResult,
}

impl Display for HandlerTerminated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Completion handler for {} terminated with {}", self.target, self.outcome)
    }
}

impl StructuredLog for HandlerTerminated<'_> {
    fn log(&self) {
        tracing::debug!(
            target_name = self.target,
            success = self.outcome.is_success(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "handler_terminated",
            span_name = name,
            target_name = self.target,
            success = self.outcome.is_success(),
        )
    }
}

/// Handler terminal operation invoked after the handler already fired.
///
/// `rejected` carries the reason of a late `on_reject`, which would otherwise
/// be lost.
///
/// # Log Level
/// `error!` - Programming error at the call site
pub struct TerminationMisuseDetected<'a> {
    pub target: &'a str,
    pub rejected: Option<&'a FailureReason>,
}

impl Display for TerminationMisuseDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Completion handler for {} invoked after it was already terminated",
            self.target
        )?;
        if let Some(reason) = self.rejected {
            write!(f, " (late rejection: {})", reason)?;
        }
        Ok(())
    }
}

impl StructuredLog for TerminationMisuseDetected<'_> {
    fn log(&self) {
        match self.rejected {
            Some(reason) => tracing::error!(
                target_name = self.target,
                rejection = %reason,
                "{}", self
            ),
            None => tracing::error!(target_name = self.target, "{}", self),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "termination_misuse",
            span_name = name,
            target_name = self.target,
            late_rejection = self.rejected.is_some(),
        )
    }
}

/// The ack, fail or callback invocation failed after the outcome was decided.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use dagwood_bridge::bridge::CompletionResult;
/// use dagwood_bridge::observability::messages::bridge::SecondaryFailureDetected;
///
/// let error = anyhow::anyhow!("broker connection lost");
/// let msg = SecondaryFailureDetected {
///     target: "message in-7",
///     outcome: &CompletionResult::Success,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct SecondaryFailureDetected<'a> {
    pub target: &'a str,
    pub outcome: &'a CompletionResult,
    pub error: &'a anyhow::Error,
}

impl Display for SecondaryFailureDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Terminating {} with {} failed: {:#}",
            self.target, self.outcome, self.error
        )
    }
}

impl StructuredLog for SecondaryFailureDetected<'_> {
    fn log(&self) {
        tracing::error!(
            target_name = self.target,
            success = self.outcome.is_success(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "secondary_failure",
            span_name = name,
            target_name = self.target,
            error = %self.error,
        )
    }
}
