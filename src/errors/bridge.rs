// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced by completion handlers and channel views.

use std::time::Duration;
use thiserror::Error;

use crate::bridge::FailureReason;

/// Errors returned from a handler's terminal operation or from a channel view.
///
/// `Upstream` is the forwarded rejection of the promise chain and displays
/// exactly like the original error, so downstream stages see the same
/// message. Every other variant is raised by the bridge or the channel
/// runtime itself.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The upstream future rejected; the reason is forwarded unchanged.
    #[error("{0}")]
    Upstream(FailureReason),

    /// A handler's terminal operation was invoked after it already fired.
    ///
    /// When the late call was a rejection its reason is kept in `rejected`.
    #[error("Completion handler for {target} was already terminated{}", rejected_suffix(.rejected))]
    TerminationMisuse {
        target: String,
        rejected: Option<FailureReason>,
    },

    /// No port with the requested name exists on the collector.
    #[error("No {direction} port named '{port}'")]
    PortNotFound {
        direction: &'static str,
        port: String,
    },

    /// The channel behind the port is closed.
    #[error("Port '{port}' is closed")]
    PortClosed { port: String },

    /// The receiving component failed the message.
    #[error("Message {id} was failed by the receiver: {reason}")]
    Nacked { id: String, reason: FailureReason },

    /// The receiving component dropped the message without acking or failing it.
    #[error("Message {id} was dropped without acknowledgement")]
    Abandoned { id: String },

    /// No acknowledgement arrived within the configured timeout.
    #[error("Message {id} was not acknowledged within {timeout:?}")]
    AckTimeout { id: String, timeout: Duration },

    /// The receiving port's buffer stayed full until the deadline passed.
    #[error("Port '{port}' did not accept the message within {timeout:?}")]
    Backpressure { port: String, timeout: Duration },
}

fn rejected_suffix(rejected: &Option<FailureReason>) -> String {
    match rejected {
        Some(reason) => format!(" (late rejection: {})", reason),
        None => String::new(),
    }
}

impl BridgeError {
    /// The upstream rejection carried by this error: the forwarded reason of
    /// a pass-through rejection, or the reason handed to a handler that was
    /// already terminated.
    pub fn upstream(&self) -> Option<&FailureReason> {
        match self {
            BridgeError::Upstream(reason) => Some(reason),
            BridgeError::TerminationMisuse {
                rejected: Some(reason),
                ..
            } => Some(reason),
            _ => None,
        }
    }
}
