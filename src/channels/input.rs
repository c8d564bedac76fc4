// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::bridge::CompletionBridge;
use crate::errors::BridgeError;
use crate::observability::messages::channel::{
    MessageProcessingFailed, PortProcessingStarted, PortProcessingStopped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{InboundMessage, InputChannel, InputChannels, MessageHandler, UnitOfWork};

/// View over a component's input ports.
#[derive(Debug, Clone)]
pub struct InputView {
    channels: Arc<dyn InputChannels>,
    bridge: CompletionBridge,
}

impl InputView {
    pub fn new(channels: Arc<dyn InputChannels>, bridge: CompletionBridge) -> Self {
        Self { channels, bridge }
    }

    pub fn port(&self, name: &str) -> Result<InputPortView, BridgeError> {
        let port = self
            .channels
            .channel(name)
            .ok_or_else(|| BridgeError::PortNotFound {
                direction: "input",
                port: name.to_string(),
            })?;

        Ok(InputPortView {
            port,
            bridge: self.bridge.clone(),
        })
    }

    pub fn port_names(&self) -> Vec<String> {
        self.channels.channel_names()
    }
}

/// View over a single input port.
#[derive(Debug, Clone)]
pub struct InputPortView {
    port: Arc<dyn InputChannel>,
    bridge: CompletionBridge,
}

impl InputPortView {
    pub fn name(&self) -> &str {
        self.port.name()
    }

    /// Next message, or `None` once the port is closed and drained.
    pub async fn recv(&self) -> Option<Box<dyn InboundMessage>> {
        self.port.recv().await
    }

    /// Run `handler` on every message until the port closes or `shutdown` fires.
    ///
    /// Each message is wrapped in a `BridgeHandler`: a successful handler acks
    /// it, a failed one fails it with the handler's error. Returns the number
    /// of messages processed.
    pub async fn run<H>(&self, handler: &H, shutdown: CancellationToken) -> usize
    where
        H: MessageHandler + ?Sized,
    {
        let started = PortProcessingStarted {
            port: self.port.name(),
            handler: handler.name(),
        };
        let span = started.span("input_port");
        started.log();

        let (processed, reason) = self.drain(handler, shutdown).instrument(span).await;

        PortProcessingStopped {
            port: self.port.name(),
            handler: handler.name(),
            processed,
            reason,
        }
        .log();

        processed
    }

    async fn drain<H>(&self, handler: &H, shutdown: CancellationToken) -> (usize, &'static str)
    where
        H: MessageHandler + ?Sized,
    {
        let mut processed = 0;
        loop {
            let message = tokio::select! {
                _ = shutdown.cancelled() => return (processed, "cancelled"),
                message = self.port.recv() => message,
            };
            let Some(mut message) = message else {
                return (processed, "closed");
            };

            let message_id = message.id().to_string();
            let payload = message.take_payload();
            let completion = self.bridge.for_unit_of_work::<(), _>(message);

            if let Err(error) = completion.settle(handler.handle(payload)).await {
                MessageProcessingFailed {
                    port: self.port.name(),
                    message_id: &message_id,
                    error: &error,
                }
                .log();
            }
            processed += 1;
        }
    }
}
