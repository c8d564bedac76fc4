// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::bridge::SecondaryFailure;

/// Supervisor notified when an ack, fail or callback invocation itself fails.
///
/// Called after the primary outcome was already decided; the report never
/// changes what the handler returns.
pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: &SecondaryFailure);
}
