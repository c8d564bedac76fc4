// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory component runtime: instances, ports and messages, implementing
//! the channel traits in `traits::channel`.
//!
//! Ports are bounded tokio channels. A sent message carries a oneshot reply
//! slot; the receiver acks or fails it and the sender's `send` resolves with
//! the outcome, bounded by the port's acknowledgement timeout.

mod instance;
mod message;
mod port;

pub use instance::{ComponentInstance, InputCollector, OutputCollector};
pub use message::{Acknowledgement, Message};
pub use port::{InputPort, OutputPort};
