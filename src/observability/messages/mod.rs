// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! `StructuredLog` to emit it at a fixed level with typed fields.
//!
//! * `bridge` - Completion handler lifecycle
//! * `channel` - Input/output port events

use tracing::Span;

pub mod bridge;
pub mod channel;

/// Emit a message as a structured `tracing` event or span.
pub trait StructuredLog {
    /// Log the message at the level fixed for its type.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
