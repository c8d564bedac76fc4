// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default number of messages an input port buffers before senders wait
pub const DEFAULT_PORT_CAPACITY: usize = 64;
/// Default time an output port waits for a receiver to ack or fail a message (30 seconds)
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 30_000;
