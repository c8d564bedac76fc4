// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging in the bridge. Message types follow a struct-based pattern with `Display`
//! and `StructuredLog` implementations to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep log levels and field names consistent per event
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::bridge` - Handler termination, misuse and secondary failures
//! * `messages::channel` - Port dispatch, acknowledgement and processing loop events
//!
//! # Usage
//!
//! ```rust
//! use dagwood_bridge::observability::messages::{bridge::TerminationMisuseDetected, StructuredLog};
//!
//! TerminationMisuseDetected {
//!     target: "message in-1",
//!     rejected: None,
//! }
//! .log();
//! ```

pub mod messages;
