// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for input/output port events.
//!
//! This module contains message types for logging events related to:
//! * Messages dispatched on an output port
//! * Receivers whose buffer stays full, and acknowledgements that never arrive
//! * The input port processing loop (start, per-message failure, stop)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Whole milliseconds of `duration`, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Message dispatched to the receivers connected to an output port.
///
/// # Log Level
/// `debug!` - Emitted once per send
pub struct MessageDispatched<'a> {
    pub port: &'a str,
    pub message_id: &'a str,
    pub receivers: usize,
}

impl Display for MessageDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Port '{}' dispatched message {} to {} receiver(s)",
            self.port, self.message_id, self.receivers
        )
    }
}

impl StructuredLog for MessageDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            port = self.port,
            message_id = self.message_id,
            receivers = self.receivers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "message_dispatched",
            span_name = name,
            port = self.port,
            message_id = self.message_id,
        )
    }
}

/// A receiving port's buffer stayed full until the send deadline.
///
/// # Log Level
/// `warn!` - Degraded but recoverable
pub struct DispatchTimedOut<'a> {
    pub port: &'a str,
    pub target: &'a str,
    pub timeout: Duration,
}

impl Display for DispatchTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Port '{}' could not hand a message to '{}' within {:?}",
            self.port, self.target, self.timeout
        )
    }
}

impl StructuredLog for DispatchTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(
            port = self.port,
            receiver = self.target,
            timeout_ms = millis(self.timeout),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "dispatch_timed_out",
            span_name = name,
            port = self.port,
            receiver = self.target,
        )
    }
}

/// No acknowledgement arrived for a dispatched message.
///
/// # Log Level
/// `warn!` - Degraded but recoverable
pub struct AckTimedOut<'a> {
    pub port: &'a str,
    pub message_id: &'a str,
    pub timeout: Duration,
}

impl Display for AckTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Port '{}' gave up waiting for acknowledgement of {} after {:?}",
            self.port, self.message_id, self.timeout
        )
    }
}

impl StructuredLog for AckTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(
            port = self.port,
            message_id = self.message_id,
            timeout_ms = millis(self.timeout),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "ack_timed_out",
            span_name = name,
            port = self.port,
            message_id = self.message_id,
        )
    }
}

/// Input port processing loop started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use dagwood_bridge::observability::messages::channel::PortProcessingStarted;
///
/// let msg = PortProcessingStarted {
///     port: "in",
///     handler: "word_counter",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PortProcessingStarted<'a> {
    pub port: &'a str,
    pub handler: &'a str,
}

impl Display for PortProcessingStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Port '{}' processing started with handler '{}'", self.port, self.handler)
    }
}

impl StructuredLog for PortProcessingStarted<'_> {
    fn log(&self) {
        tracing::info!(port = self.port, handler = self.handler, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "port_processing",
            span_name = name,
            port = self.port,
            handler = self.handler,
        )
    }
}

/// Handler rejected a message; the message was failed.
///
/// # Log Level
/// `warn!` - Message-level failure, processing continues
pub struct MessageProcessingFailed<'a> {
    pub port: &'a str,
    pub message_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for MessageProcessingFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Port '{}' failed message {}: {}",
            self.port, self.message_id, self.error
        )
    }
}

impl StructuredLog for MessageProcessingFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            port = self.port,
            message_id = self.message_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "message_processing_failed",
            span_name = name,
            port = self.port,
            message_id = self.message_id,
        )
    }
}

/// Input port processing loop stopped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PortProcessingStopped<'a> {
    pub port: &'a str,
    pub handler: &'a str,
    pub processed: usize,
    pub reason: &'a str,
}

impl Display for PortProcessingStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Port '{}' processing with handler '{}' stopped ({}) after {} message(s)",
            self.port, self.handler, self.reason, self.processed
        )
    }
}

impl StructuredLog for PortProcessingStopped<'_> {
    fn log(&self) {
        tracing::info!(
            port = self.port,
            handler = self.handler,
            processed = self.processed,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "port_processing_stopped",
            span_name = name,
            port = self.port,
            processed = self.processed,
        )
    }
}
