// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

/// Business logic run for each message received on an input port.
///
/// Returning `Ok` acks the message, returning `Err` fails it with the error
/// as reason.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: serde_json::Value) -> anyhow::Result<()>;

    fn name(&self) -> &'static str;
}
