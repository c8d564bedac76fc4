// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Collaborator seams for the channel runtime a component runs on.
//!
//! Views and the facade only talk to these traits. `runtime` is the in-memory
//! implementation; another runtime plugs in by implementing them.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::BridgeError;
use crate::traits::UnitOfWork;

/// A received message: a unit of work carrying a JSON payload.
pub trait InboundMessage: UnitOfWork {
    /// Address the message was sent from.
    fn source(&self) -> &str;

    fn payload(&self) -> &serde_json::Value;

    /// Move the payload out, leaving `null` behind.
    fn take_payload(&mut self) -> serde_json::Value;
}

/// One inbound port.
#[async_trait]
pub trait InputChannel: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Next message, or `None` once the channel is closed and drained.
    async fn recv(&self) -> Option<Box<dyn InboundMessage>>;
}

/// One outbound port.
#[async_trait]
pub trait OutputChannel: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Number of receivers a send is delivered to.
    fn connections(&self) -> usize;

    /// Deliver `payload` and resolve once every receiver acknowledged it.
    async fn send(&self, payload: serde_json::Value) -> Result<(), BridgeError>;
}

/// The named input channels of a component.
pub trait InputChannels: Send + Sync + Debug {
    fn channel(&self, name: &str) -> Option<Arc<dyn InputChannel>>;

    /// Names in declaration order.
    fn channel_names(&self) -> Vec<String>;
}

/// The named output channels of a component.
pub trait OutputChannels: Send + Sync + Debug {
    fn channel(&self, name: &str) -> Option<Arc<dyn OutputChannel>>;

    /// Names in declaration order.
    fn channel_names(&self) -> Vec<String>;
}

/// A live component instance as seen by its facade.
pub trait ChannelHost: Send + Sync + Debug {
    fn id(&self) -> &str;

    fn input_channels(&self) -> Arc<dyn InputChannels>;

    fn output_channels(&self) -> Arc<dyn OutputChannels>;
}
