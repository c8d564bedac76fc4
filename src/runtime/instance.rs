// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::ComponentContext;
use crate::errors::BridgeError;
use crate::runtime::port::{InputPort, OutputPort};
use crate::traits::{ChannelHost, InputChannel, InputChannels, OutputChannel, OutputChannels};

/// The input ports of a component instance.
#[derive(Debug, Default)]
pub struct InputCollector {
    ports: Vec<Arc<InputPort>>,
}

impl InputCollector {
    pub fn port(&self, name: &str) -> Option<&Arc<InputPort>> {
        self.ports.iter().find(|port| port.name() == name)
    }

    /// Port names in declaration order.
    pub fn port_names(&self) -> Vec<&str> {
        self.ports.iter().map(|port| port.name()).collect()
    }

    pub fn close(&self) {
        self.ports.iter().for_each(|port| port.close());
    }
}

impl InputChannels for InputCollector {
    fn channel(&self, name: &str) -> Option<Arc<dyn InputChannel>> {
        self.port(name)
            .map(|port| Arc::clone(port) as Arc<dyn InputChannel>)
    }

    fn channel_names(&self) -> Vec<String> {
        self.port_names().into_iter().map(str::to_string).collect()
    }
}

/// The output ports of a component instance.
#[derive(Debug, Default)]
pub struct OutputCollector {
    ports: Vec<Arc<OutputPort>>,
}

impl OutputCollector {
    pub fn port(&self, name: &str) -> Option<&Arc<OutputPort>> {
        self.ports.iter().find(|port| port.name() == name)
    }

    /// Port names in declaration order.
    pub fn port_names(&self) -> Vec<&str> {
        self.ports.iter().map(|port| port.name()).collect()
    }

    pub fn close(&self) {
        self.ports.iter().for_each(|port| port.close());
    }
}

impl OutputChannels for OutputCollector {
    fn channel(&self, name: &str) -> Option<Arc<dyn OutputChannel>> {
        self.port(name)
            .map(|port| Arc::clone(port) as Arc<dyn OutputChannel>)
    }

    fn channel_names(&self) -> Vec<String> {
        self.port_names().into_iter().map(str::to_string).collect()
    }
}

/// Live handle to a running component.
///
/// Owns the input and output collectors built from the component's context.
/// Ports are wired between instances with `connect`.
#[derive(Debug)]
pub struct ComponentInstance {
    id: String,
    address: String,
    input: Arc<InputCollector>,
    output: Arc<OutputCollector>,
}

impl ComponentInstance {
    /// Build the ports declared by `context`.
    pub fn new(context: &ComponentContext) -> Self {
        let capacity = context.channels.get_capacity();
        let ack_timeout = context.channels.get_ack_timeout();
        let address = context.address().to_string();

        let input = InputCollector {
            ports: context
                .inputs
                .iter()
                .map(|name| Arc::new(InputPort::new(name.as_str(), capacity)))
                .collect(),
        };
        let output = OutputCollector {
            ports: context
                .outputs
                .iter()
                .map(|name| Arc::new(OutputPort::new(name.as_str(), &address, ack_timeout)))
                .collect(),
        };

        Self {
            id: context.id.clone(),
            address,
            input: Arc::new(input),
            output: Arc::new(output),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn input(&self) -> &Arc<InputCollector> {
        &self.input
    }

    pub fn output(&self) -> &Arc<OutputCollector> {
        &self.output
    }

    /// Wire this instance's `output_port` to `input_port` on `target`.
    pub fn connect(
        &self,
        output_port: &str,
        target: &ComponentInstance,
        input_port: &str,
    ) -> Result<(), BridgeError> {
        let output = self.output.port(output_port).ok_or_else(|| BridgeError::PortNotFound {
            direction: "output",
            port: output_port.to_string(),
        })?;
        let input = target.input.port(input_port).ok_or_else(|| BridgeError::PortNotFound {
            direction: "input",
            port: input_port.to_string(),
        })?;

        output.connect(input, format!("{}.{}", target.address, input_port))
    }

    /// Disconnect all output ports and close all input ports.
    pub fn close(&self) {
        self.output.close();
        self.input.close();
    }
}

impl ChannelHost for ComponentInstance {
    fn id(&self) -> &str {
        &self.id
    }

    fn input_channels(&self) -> Arc<dyn InputChannels> {
        Arc::clone(&self.input) as Arc<dyn InputChannels>
    }

    fn output_channels(&self) -> Arc<dyn OutputChannels> {
        Arc::clone(&self.output) as Arc<dyn OutputChannels>
    }
}
