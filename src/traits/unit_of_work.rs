// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::bridge::FailureReason;

/// A message or task that must be terminated exactly once.
///
/// Both terminal operations consume the unit: once acked or failed, ownership
/// passes to the runtime that issued it. Terminating a unit the runtime no
/// longer tracks is reported as an error.
pub trait UnitOfWork: Send {
    /// Identifier used in diagnostics.
    fn id(&self) -> &str;

    /// Mark the unit as successfully processed.
    fn ack(self: Box<Self>) -> anyhow::Result<()>;

    /// Mark the unit as failed with `reason`.
    fn fail(self: Box<Self>, reason: &FailureReason) -> anyhow::Result<()>;
}

impl<U: UnitOfWork + ?Sized> UnitOfWork for Box<U> {
    fn id(&self) -> &str {
        U::id(self)
    }

    fn ack(self: Box<Self>) -> anyhow::Result<()> {
        U::ack(*self)
    }

    fn fail(self: Box<Self>, reason: &FailureReason) -> anyhow::Result<()> {
        U::fail(*self, reason)
    }
}
