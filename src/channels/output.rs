// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::BridgeError;
use crate::traits::{OutputChannel, OutputChannels};

/// View over a component's output ports.
#[derive(Debug, Clone)]
pub struct OutputView {
    channels: Arc<dyn OutputChannels>,
}

impl OutputView {
    pub fn new(channels: Arc<dyn OutputChannels>) -> Self {
        Self { channels }
    }

    pub fn port(&self, name: &str) -> Result<OutputPortView, BridgeError> {
        let port = self
            .channels
            .channel(name)
            .ok_or_else(|| BridgeError::PortNotFound {
                direction: "output",
                port: name.to_string(),
            })?;

        Ok(OutputPortView { port })
    }

    pub fn port_names(&self) -> Vec<String> {
        self.channels.channel_names()
    }
}

/// View over a single output port.
#[derive(Debug, Clone)]
pub struct OutputPortView {
    port: Arc<dyn OutputChannel>,
}

impl OutputPortView {
    pub fn name(&self) -> &str {
        self.port.name()
    }

    /// Number of input ports this port delivers to.
    pub fn connections(&self) -> usize {
        self.port.connections()
    }

    /// Send `payload` and resolve once every receiver acknowledged it.
    ///
    /// A receiver failing the message yields `BridgeError::Nacked`; with the
    /// in-memory runtime a full receiver yields `BridgeError::Backpressure`
    /// and a missing acknowledgement `BridgeError::AckTimeout`.
    pub async fn send(&self, payload: serde_json::Value) -> Result<(), BridgeError> {
        self.port.send(payload).await
    }
}
